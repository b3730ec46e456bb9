//! Grammar coverage: each top-level form, statement and expression kind,
//! and the context-sensitive constraints.

mod glsl_test;

use glmin_syntax::{
    ast::{Expr, UnaryOp},
    parse, parse_expression, StartRule,
};
use glsl_test::{assert_canonical, assert_rejects, assert_round_trip, canonical};

const VERTEX: StartRule = StartRule::Vertex;
const FRAGMENT: StartRule = StartRule::Fragment;
const CONDITION: StartRule = StartRule::Condition;

#[test]
fn test_empty_function() {
    assert_round_trip("void main(){}", VERTEX);
}

#[test]
fn test_plain_directives() {
    for directive in ["define", "undef", "pragma", "version", "error", "extension", "line"] {
        let source = format!("#{} something", directive);
        assert_canonical(&source, VERTEX, &format!("{}\n", source));
    }
}

#[test]
fn test_conditional_directives() {
    for directive in ["ifdef", "ifndef", "if"] {
        let source = format!(
            "#{} FOO\nvoid main(){{}}\n#elif BAR\nvoid barMain(){{}}\n#else\nvoid elseMain(){{}}\n#endif",
            directive
        );
        assert_canonical(&source, VERTEX, &format!("{}\n", source));
    }
}

#[test]
fn test_endif_without_if() {
    assert_rejects(
        "#define FOO\nvoid main(){}\n#endif",
        VERTEX,
        "#endif without an #if",
    );
}

#[test]
fn test_ifdef_without_endif() {
    assert_rejects("#ifdef FOO\nvoid main(){}\n", VERTEX, "#ifdef without #endif");
}

#[test]
fn test_unterminated_conditional_reports_opener() {
    let err = parse("int a;\n#ifdef FOO\nint b;\n", VERTEX).unwrap_err();
    assert_eq!(err.line, 2);
    assert_eq!(err.column, 1);
    assert!(err.message.contains("unterminated"), "{}", err.message);
}

#[test]
fn test_attribute_declaration() {
    assert_round_trip("attribute vec2 something;", VERTEX);
    assert_round_trip("attribute vec3 something,somethingElse;", VERTEX);
    assert_rejects("attribute vec2 something;", FRAGMENT, "attribute in a fragment shader");
    assert_rejects("attribute float something = 11.1;", VERTEX, "initialized attribute");
    assert_rejects("attribute float problems[99];", VERTEX, "attribute array");
}

#[test]
fn test_fully_specified_type() {
    for qualifier in ["", "const ", "varying ", "invariant varying ", "uniform "] {
        assert_round_trip(&format!("{}highp vec4 something;", qualifier), VERTEX);
        assert_round_trip(&format!("{}mat2 something,somethingElse[12];", qualifier), VERTEX);
    }
    assert_rejects(
        "void main(){varying float not_me;}",
        VERTEX,
        "local declarations can't have storage qualifiers",
    );
}

#[test]
fn test_function_prototype() {
    assert_round_trip("void func();", VERTEX);
    assert_round_trip("highp mat3 func();", VERTEX);
    assert_round_trip("float func(mat4 a,bool b);", VERTEX);
    assert_round_trip("void func(in sampler2D a,inout highp float b);", VERTEX);
    assert_round_trip("float func(const in samplerCube a[12]);", VERTEX);
    assert_round_trip("float func(float,vec2);", VERTEX);
    assert_rejects("void func(const out float a);", VERTEX, "only in parameters can be const");
    assert_rejects("void func(varying out float a);", VERTEX, "parameters can't have qualifiers");
}

#[test]
fn test_locally_specified_type() {
    assert_round_trip("void main(){int x;}", VERTEX);
    assert_round_trip("void main(){int x[1];}", VERTEX);
    assert_round_trip("void main(){const highp int x[],y;}", VERTEX);
    assert_rejects("void main(){void x;}", VERTEX, "void variables");
    assert_rejects("void main(){int lowp;}", VERTEX, "reserved names");
}

#[test]
fn test_struct() {
    assert_round_trip("struct{int x;};", VERTEX);
    assert_round_trip("varying struct{int x[1],y;};", VERTEX);
    assert_round_trip("struct s{int x;highp float y;};", VERTEX);
    assert_round_trip("struct s{int x;}z;", VERTEX);
    assert_round_trip("struct s{int x;}z;struct s2{s y;}q;", VERTEX);
    assert_rejects("struct{int x[];};", VERTEX, "arrays in structs must have a size");
    assert_rejects(
        "struct{int x;struct {int y;}a;};",
        VERTEX,
        "structs can't be embedded in structs",
    );
}

#[test]
fn test_int_constant() {
    assert_round_trip("int x=128;", VERTEX);
    assert_canonical("int x=0x80;", VERTEX, "int x=128;");
    assert_canonical("int x=0200;", VERTEX, "int x=128;");
    assert_round_trip("int x=0;", VERTEX);
}

#[test]
fn test_float_constant() {
    assert_round_trip("float x=12.8;", VERTEX);
    assert_round_trip("float x=1.28e23;", VERTEX);
    assert_round_trip("float x=1.28e-23;", VERTEX);
    assert_round_trip("float x=1e23;", VERTEX);
    assert_canonical("float x=0.50;", VERTEX, "float x=.5;");
    assert_canonical("float x=42.0;", VERTEX, "float x=42.;");
}

#[test]
fn test_bool_constant() {
    assert_round_trip("bool b=false;", VERTEX);
    assert_round_trip("bool b=true;", VERTEX);
}

#[test]
fn test_postfix() {
    assert_round_trip("x[1]", CONDITION);
    assert_round_trip("x.xyz", CONDITION);
    assert_round_trip("x[1].xyz[1]", CONDITION);
    assert_round_trip("x++", CONDITION);
    assert_canonical("x ++", CONDITION, "x++");
    assert_round_trip("x--", CONDITION);
    assert_round_trip("x[1].xyz[1]++", CONDITION);
    assert_round_trip("x[1]++.rgba", CONDITION);
    assert_rejects("x++++", CONDITION, "++/-- can't repeat");
    assert_rejects("x++--", CONDITION, "++/-- can't repeat");
}

#[test]
fn test_unary() {
    let cases = [
        ("-", UnaryOp::Minus),
        ("+", UnaryOp::Plus),
        ("++", UnaryOp::Inc),
        ("--", UnaryOp::Dec),
        ("!", UnaryOp::Not),
        ("~", UnaryOp::BitNot),
    ];
    for (token, expected) in cases {
        let source = format!("{}x", token);
        assert_round_trip(&source, CONDITION);
        match parse_expression(&source).unwrap() {
            Expr::Unary { op, operand } => {
                assert_eq!(op, expected);
                assert_eq!(*operand, Expr::identifier("x"));
            }
            other => panic!("{} parsed as {:?}", source, other),
        }
    }
}

#[test]
fn test_binary() {
    let operators = [
        "*", "/", "%", "+", "-", "<<", ">>", "<", ">", "<=", "==", ">=", "!=", "&", "^", "|",
        "&&", "^^", "||",
    ];
    for operator in operators {
        let source = format!("x{}y", operator);
        assert_round_trip(&source, CONDITION);
        match parse_expression(&source).unwrap() {
            Expr::Binary { left, op, right } => {
                assert_eq!(op.as_str(), operator);
                assert_eq!(*left, Expr::identifier("x"));
                assert_eq!(*right, Expr::identifier("y"));
            }
            other => panic!("{} parsed as {:?}", source, other),
        }
    }
    assert_round_trip("(x+y)*9", CONDITION);
}

#[test]
fn test_assignment_and_ternary() {
    for operator in ["=", "+=", "-=", "*=", "/=", "%=", "<<=", ">>=", "&=", "^=", "|="] {
        assert_round_trip(&format!("x{}y", operator), CONDITION);
    }
    assert_round_trip("a?b:c?d:e", CONDITION);
    assert_round_trip("(a?b:c)?d:e", CONDITION);
    assert_round_trip("a=b?c:d", CONDITION);
    assert_canonical("a = (b = c)", CONDITION, "a=b=c");
}

#[test]
fn test_function_call() {
    assert_round_trip("void main(){func(a,b,c);}", VERTEX);
    assert_canonical("void main(){func(void);}", VERTEX, "void main(){func();}");
}

#[test]
fn test_statements() {
    assert_round_trip(
        "void main(){if(a)b();else{c();}while(x<3)x++;do x--;while(x>0);for(int i=0;i<2;i++){continue;}for(;;)break;return;}",
        VERTEX,
    );
    assert_round_trip("void main(){discard;}", FRAGMENT);
    assert_round_trip("float f(){return 1.;}", FRAGMENT);
}

#[test]
fn test_precision_and_invariant() {
    assert_round_trip("precision mediump float;varying vec4 v;invariant v;", FRAGMENT);
    assert_round_trip("invariant gl_Position;", VERTEX);
}

#[test]
fn test_white_space_function() {
    let source = "
precision highp float;
attribute vec4 aOutput;
float someFunc(void);

void main(void) {
  gl_Position = someFunc() * vec4(1.,2.,3.,4.);
}
float someFunc(void) {
  return 42.0;
}";
    let golden = concat!(
        "precision highp float;",
        "attribute vec4 aOutput;",
        "float someFunc();",
        "void main(){",
        "gl_Position=someFunc()*vec4(1.,2.,3.,4.);",
        "}",
        "float someFunc(){",
        "return 42.;",
        "}",
    );
    assert_eq!(canonical(source, VERTEX), golden);
}

#[test]
fn test_comments_are_whitespace() {
    let source = "/* header */\nuniform float u; // trailing\nvoid main(){/* inner */}";
    assert_eq!(canonical(source, VERTEX), "uniform float u;void main(){}");
}

#[test]
fn test_error_position() {
    let err = parse("void main(){\n  int x = ;\n}", VERTEX).unwrap_err();
    assert_eq!(err.line, 2);
    assert!(err.column > 1);
}

#[test]
fn test_gl_prefix_is_reserved() {
    assert_rejects("float gl_foo;", VERTEX, "gl_ variable");
    assert_rejects("void gl_helper(){}", VERTEX, "gl_ function");
    assert_rejects("void f(float gl_x){}", VERTEX, "gl_ parameter");
}

#[test]
fn test_directive_inside_function_body() {
    let err = parse("void main(){\n#ifdef A\nx=1.;\n#endif\n}", VERTEX).unwrap_err();
    assert_eq!(err.message, "preprocessor directives are only allowed at top level");
    assert_eq!(err.line, 2);
    assert_eq!(err.column, 1);
}

#[test]
fn test_deep_nesting_is_rejected() {
    let deep = format!("{}x{}", "(".repeat(5000), ")".repeat(5000));
    let err = parse(&deep, CONDITION).unwrap_err();
    assert_eq!(err.message, "nesting is too deep");

    let nested = format!("{}x{}", "(".repeat(40), ")".repeat(40));
    assert_eq!(canonical(&nested, CONDITION), "x");
}
