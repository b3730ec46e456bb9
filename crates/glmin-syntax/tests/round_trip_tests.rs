//! Canonical output is stable: emitting a parsed shader and parsing the
//! result gives back the same tree.

mod glsl_test;

use glmin_syntax::StartRule;
use glsl_test::{assert_canonical, assert_stable, canonical};

const LIGHTING_VERTEX: &str = r#"
#version 100
#define SCALE 2.0
attribute vec3 aPosition;
attribute vec3 aNormal;
uniform mat4 uModelView, uProjection;
uniform mat3 uNormalMatrix;
varying vec3 vNormal;
varying highp vec4 vColor;

struct Light {
    vec3 direction;
    vec4 color[2];
};
uniform Light uLights[4];

float lambert(vec3 n, vec3 l);

float lambert(vec3 n, vec3 l) {
    return max(dot(n, l), 0.0);
}

void main(void) {
    vec4 position = uModelView * vec4(aPosition * SCALE, 1.0);
    vNormal = normalize(uNormalMatrix * aNormal);
    vColor = vec4(0.0);
    for (int i = 0; i < 4; ++i) {
        vColor += uLights[i].color[0] * lambert(vNormal, -uLights[i].direction);
    }
    gl_Position = uProjection * position;
}
"#;

const BRANCHY_FRAGMENT: &str = r#"
precision mediump float;
varying vec3 vNormal;
varying highp vec4 vColor;
uniform sampler2D uTexture;
uniform bool uFlip;

#ifdef USE_FOG
uniform float uFogDensity;
float fog(float depth) { return exp(-uFogDensity * depth * depth); }
#else
float fog(float depth) { return 1.0; }
#endif

void main() {
    vec2 uv = uFlip ? vec2(vNormal.x, 1.0 - vNormal.y) : vNormal.xy;
    vec4 texel = texture2D(uTexture, uv);
    if (texel.a < 0.5) discard;
    int k = 0;
    while (k < 3) { k += 1; if (k == 2) break; else continue; }
    do { k--; } while (k > 0 && !uFlip ^^ uFlip);
    gl_FragColor = texel * vColor * fog(gl_FragCoord.z / gl_FragCoord.w);
}
"#;

#[test]
fn test_vertex_shader_is_stable() {
    assert_stable(LIGHTING_VERTEX, StartRule::Vertex);
}

#[test]
fn test_fragment_shader_is_stable() {
    assert_stable(BRANCHY_FRAGMENT, StartRule::Fragment);
}

#[test]
fn test_vertex_shader_canonical_text() {
    let text = canonical(LIGHTING_VERTEX, StartRule::Vertex);
    assert!(text.starts_with("#version 100\n#define SCALE 2.0\nattribute vec3 aPosition;"));
    assert!(text.contains("uniform mat4 uModelView,uProjection;"));
    assert!(text.contains("struct Light{vec3 direction;vec4 color[2];};"));
    assert!(text.contains("float lambert(vec3 n,vec3 l){return max(dot(n,l),0.);}"));
    assert!(text.contains("for(int i=0;i<4;++i){"));
    assert!(text.contains("lambert(vNormal,-uLights[i].direction)"));
    assert!(text.ends_with("gl_Position=uProjection*position;}"));
}

#[test]
fn test_fragment_conditional_layout() {
    let text = canonical(BRANCHY_FRAGMENT, StartRule::Fragment);
    assert!(text.contains("uniform bool uFlip;\n#ifdef USE_FOG\nuniform float uFogDensity;"));
    assert!(text.contains("\n#else\nfloat fog(float depth){return 1.;}\n#endif\nvoid main(){"));
}

#[test]
fn test_operators_that_would_merge() {
    assert_canonical("a + +b", StartRule::Condition, "a+ +b");
    assert_canonical("a - -b", StartRule::Condition, "a- -b");
    assert_canonical("a - --b", StartRule::Condition, "a- --b");
    assert_canonical("a++ + b", StartRule::Condition, "a++ +b");
}

#[test]
fn test_parentheses_are_minimal() {
    assert_canonical("((a)) + ((b * c))", StartRule::Condition, "a+b*c");
    assert_canonical("(a + b) - (c - d)", StartRule::Condition, "a+b-(c-d)");
    assert_canonical("-(a.x)", StartRule::Condition, "-a.x");
    assert_canonical("(-a).x", StartRule::Condition, "(-a).x");
    assert_canonical("f((a, b), c)", StartRule::Condition, "f((a,b),c)");
    assert_canonical("(x++)++", StartRule::Condition, "(x++)++");
}
