#[cfg(test)]
mod interpreter_tests {
    use kin_lang as kin;

    use kin::error::{KinError, Result};
    use kin::globals::create_global_env;
    use kin::interpreter::Interpreter;
    use kin::parser::Parser;
    use kin::value::Value;

    /// Parse and run `source` in a fresh global environment, returning the
    /// value of the last statement.
    fn run(source: &str) -> Result<Value> {
        let program = Parser::produce_ast(source)?;
        let env = create_global_env("")?;

        Interpreter::new().run_program(&program, &env)
    }

    fn run_number(source: &str) -> f64 {
        match run(source).unwrap() {
            Value::Number(n) => n,
            other => panic!("expected number, got {:?}", other),
        }
    }

    fn run_bool(source: &str) -> bool {
        match run(source).unwrap() {
            Value::Bool(b) => b,
            other => panic!("expected boolean, got {:?}", other),
        }
    }

    #[test]
    fn test_interp_01_arithmetic() {
        assert_eq!(run_number("1 + 2 * 3"), 7.0);
        assert_eq!(run_number("(1 + 2) * 3"), 9.0);
        assert_eq!(run_number("10 % 4"), 2.0);
        assert_eq!(run_number("2 ^ 10"), 1024.0);
        assert_eq!(run_number("7 / 2"), 3.5);
    }

    #[test]
    fn test_interp_02_arithmetic_on_non_numbers_yields_null() {
        assert_eq!(run("\"a\" + 1").unwrap(), Value::Null);
        assert_eq!(run("nibyo * 2").unwrap(), Value::Null);
    }

    #[test]
    fn test_interp_03_comparisons_require_numbers() {
        assert!(run_bool("2 < 3"));
        assert!(run_bool("3 >= 3"));

        let err = run("\"a\" < 1").unwrap_err();
        assert!(matches!(err, KinError::Type(_)), "got: {:?}", err);
    }

    #[test]
    fn test_interp_04_logical_operators_require_booleans() {
        assert!(!run_bool("nibyo && sibyo"));
        assert!(run_bool("sibyo || nibyo"));

        let err = run("1 && nibyo").unwrap_err();
        assert!(matches!(err, KinError::Type(_)), "got: {:?}", err);
    }

    #[test]
    fn test_interp_05_equality_is_type_directed() {
        assert!(run_bool("1 == 1"));
        assert!(run_bool("\"a\" != \"b\""));
        assert!(!run_bool("1 == \"1\""));
        assert!(run_bool("ubusa == ubusa"));

        // Separately constructed objects are never equal; aliases are.
        assert!(!run_bool("reka a = {x: 1} reka b = {x: 1} a == b"));
        assert!(run_bool("reka a = {x: 1} reka c = a a == c"));

        // A function equals itself through an alias.
        assert!(run_bool("porogaramu_ntoya f() { tanga; } reka g = f f == g"));
    }

    #[test]
    fn test_interp_06_function_call_and_return() {
        let source = "porogaramu_ntoya teranya(a, b) { tanga a + b } teranya(3, 4)";

        assert_eq!(run_number(source), 7.0);
    }

    #[test]
    fn test_interp_07_fallthrough_returns_null() {
        assert_eq!(
            run("porogaramu_ntoya f() { 1 + 1 } f()").unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_interp_08_return_unwinds_nested_blocks() {
        let source = "\
            porogaramu_ntoya kubara(x) { \
              niba (x > 0) { \
                subiramo_niba (nibyo) { \
                  tanga x * 10 \
                } \
              } \
              tanga 0 \
            } \
            kubara(4)";

        assert_eq!(run_number(source), 40.0);
    }

    #[test]
    fn test_interp_09_top_level_return_ends_the_program() {
        assert_eq!(run_number("tanga 5 99"), 5.0);
    }

    #[test]
    fn test_interp_10_exact_arity_is_enforced() {
        let err = run("porogaramu_ntoya f(a) { tanga a } f()").unwrap_err();
        assert!(matches!(err, KinError::Type(_)), "got: {:?}", err);

        let err = run("porogaramu_ntoya f(a) { tanga a } f(1, 2)").unwrap_err();
        assert!(matches!(err, KinError::Type(_)), "got: {:?}", err);
    }

    #[test]
    fn test_interp_11_closures_capture_their_declaration_scope() {
        let source = "\
            porogaramu_ntoya gukora_konteri() { \
              reka umubare = 0 \
              porogaramu_ntoya ongera() { \
                umubare = umubare + 1 \
                tanga umubare \
              } \
              tanga ongera \
            } \
            reka konteri = gukora_konteri() \
            konteri() \
            konteri() \
            konteri()";

        assert_eq!(run_number(source), 3.0);
    }

    #[test]
    fn test_interp_12_loop_runs_and_scopes_its_body() {
        let source = "reka i = 0 subiramo_niba (i < 3) { i = i + 1 } i";
        assert_eq!(run_number(source), 3.0);

        // Declarations inside the body do not leak out of the loop.
        let source = "reka i = 0 subiramo_niba (i < 3) { reka x = i i = i + 1 } x";
        let err = run(source).unwrap_err();
        assert!(matches!(err, KinError::Resolution(_)), "got: {:?}", err);
    }

    #[test]
    fn test_interp_13_conditions_must_be_boolean() {
        let err = run("niba (1) { 2 }").unwrap_err();
        assert!(matches!(err, KinError::Type(_)), "got: {:?}", err);

        let err = run("subiramo_niba (\"x\") { 1 }").unwrap_err();
        assert!(matches!(err, KinError::Type(_)), "got: {:?}", err);
    }

    #[test]
    fn test_interp_14_conditional_branches() {
        assert_eq!(run_number("niba (2 > 1) { 10 } niba_byanze { 20 }"), 10.0);
        assert_eq!(run_number("niba (2 < 1) { 10 } niba_byanze { 20 }"), 20.0);
        assert_eq!(
            run_number(
                "reka x = 2 \
                 niba (x == 1) { 10 } nanone_niba (x == 2) { 20 } niba_byanze { 30 }"
            ),
            20.0
        );
    }

    #[test]
    fn test_interp_15_switch_selects_the_matching_case() {
        let source = "\
            reka x = 2 \
            gereranya (x) { \
              usanze 1: \"rimwe\" \
              usanze 2: \"kabiri\" \
              ibindi: \"ikindi\" \
            }";

        assert_eq!(run(source).unwrap(), Value::String("kabiri".to_string()));

        let source = "\
            reka x = 9 \
            gereranya (x) { \
              usanze 1: \"rimwe\" \
              ibindi: \"ikindi\" \
            }";

        assert_eq!(run(source).unwrap(), Value::String("ikindi".to_string()));

        // A default block without any cases never runs.
        assert_eq!(
            run("reka x = 3 gereranya (x) { ibindi: 9 }").unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_interp_16_constants_are_protected() {
        let err = run("ntahinduka x = 1 x = 2").unwrap_err();
        assert!(matches!(err, KinError::Resolution(_)), "got: {:?}", err);

        // Function bindings are constants too.
        let err = run("porogaramu_ntoya f() { tanga; } f = 5").unwrap_err();
        assert!(matches!(err, KinError::Resolution(_)), "got: {:?}", err);

        // The built-in globals are constant, except 'ikosa'.
        let err = run("nibyo = sibyo").unwrap_err();
        assert!(matches!(err, KinError::Resolution(_)), "got: {:?}", err);

        assert_eq!(run("ikosa = 5 ikosa").unwrap(), Value::Number(5.0));
    }

    #[test]
    fn test_interp_17_redeclaration_in_the_same_scope_fails() {
        let err = run("reka x = 1 reka x = 2").unwrap_err();
        assert!(matches!(err, KinError::Resolution(_)), "got: {:?}", err);

        // Shadowing a parent binding from an inner scope is fine.
        assert_eq!(
            run_number("reka x = 1 niba (nibyo) { reka x = 2 x } "),
            2.0
        );
    }

    #[test]
    fn test_interp_18_unresolved_names_fail() {
        let err = run("ntabaho").unwrap_err();
        assert!(matches!(err, KinError::Resolution(_)), "got: {:?}", err);
    }

    #[test]
    fn test_interp_19_objects_and_members() {
        assert_eq!(run_number("reka o = {a: 1, b: 2} o.b"), 2.0);
        assert_eq!(run_number("reka o = {a: 1} o.a = 5 o.a"), 5.0);

        // Nested member write through the chain.
        assert_eq!(run_number("reka o = {a: {b: 1}} o.a.b = 2 o.a.b"), 2.0);

        // Shorthand property reads the enclosing scope.
        assert_eq!(run_number("reka y = 7 reka o = {y} o.y"), 7.0);

        // Missing properties read as null.
        assert_eq!(run("reka o = {a: 1} o.b").unwrap(), Value::Null);

        // Member access on a non-object is a type error.
        let err = run("reka x = 5 x.y").unwrap_err();
        assert!(matches!(err, KinError::Type(_)), "got: {:?}", err);
    }

    #[test]
    fn test_interp_20_arrays_are_index_keyed_objects() {
        assert_eq!(run_number("reka arr = [1, 2, 3] arr[1]"), 2.0);
        assert_eq!(run_number("reka arr = [1, 2, 3] arr[1] = 9 arr[1]"), 9.0);

        // Numeric and string forms of the same index alias one slot.
        assert_eq!(run_number("reka arr = [4, 5] arr[\"1\"]"), 5.0);
    }

    #[test]
    fn test_interp_21_calling_a_non_function_fails() {
        let err = run("reka x = 5 x(1)").unwrap_err();
        assert!(matches!(err, KinError::Type(_)), "got: {:?}", err);
    }

    #[test]
    fn test_interp_22_math_namespace() {
        assert_eq!(run_number("KIN_IMIBARE.umuzikare(9)"), 3.0);
        assert_eq!(run_number("KIN_IMIBARE.kuraho_ibice(2.6)"), 3.0);

        let pi = run_number("KIN_IMIBARE.pi");
        assert!((pi - std::f64::consts::PI).abs() < 1e-12);

        // Random stays within its inclusive bounds.
        let n = run_number("KIN_IMIBARE.umubare_utazwi(1, 6)");
        assert!((1.0..=6.0).contains(&n));
        assert_eq!(n.fract(), 0.0);
    }

    #[test]
    fn test_interp_23_string_namespace() {
        assert_eq!(
            run("KIN_AMAGAMBO.huza_amagambo(\"aba\", \"na\")").unwrap(),
            Value::String("abana".to_string())
        );

        assert_eq!(run_number("KIN_AMAGAMBO.ingano(\"abana\")"), 5.0);

        assert_eq!(
            run("KIN_AMAGAMBO.gabanya(\"a-b-c\", \"-\")[1]").unwrap(),
            Value::String("b".to_string())
        );

        // Concat rejects non-string arguments.
        let err = run("KIN_AMAGAMBO.huza_amagambo(\"a\", 1)").unwrap_err();
        assert!(matches!(err, KinError::Native(_)), "got: {:?}", err);
    }

    #[test]
    fn test_interp_24_global_constants() {
        assert_eq!(run("nibyo").unwrap(), Value::Bool(true));
        assert_eq!(run("sibyo").unwrap(), Value::Bool(false));
        assert_eq!(run("ubusa").unwrap(), Value::Null);
        assert_eq!(run("inzira_ya_dosiye").unwrap(), Value::String(String::new()));
    }

    #[test]
    fn test_interp_25_display_forms() {
        assert_eq!(run("3 + 4").unwrap().to_string(), "7");
        assert_eq!(run("3.5 + 1").unwrap().to_string(), "4.5");
        assert_eq!(run("nibyo").unwrap().to_string(), "nibyo");
        assert_eq!(run("ubusa").unwrap().to_string(), "ubusa");
        assert_eq!(
            run("{a: 1, b: \"x\"}").unwrap().to_string(),
            "{a: 1, b: x}"
        );

        // A self-referential object renders a placeholder instead of
        // recursing without bound.
        assert_eq!(
            run("reka o = {a: 1} o.a = o o").unwrap().to_string(),
            "{a: {...}}"
        );
    }

    #[test]
    fn test_interp_26_recursion() {
        let source = "\
            porogaramu_ntoya fact(n) { \
              niba (n <= 1) { tanga 1 } \
              tanga n * fact(n - 1) \
            } \
            fact(6)";

        assert_eq!(run_number(source), 720.0);
    }

    #[test]
    fn test_interp_27_invalid_assignment_target() {
        let err = run("1 = 2").unwrap_err();
        assert!(matches!(err, KinError::Type(_)), "got: {:?}", err);
    }
}
