#[cfg(test)]
mod codegen_tests {
    use std::collections::HashMap;

    use crate::codegen::generate;
    use crate::error::SemanticError;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    /// Lex, parse, and generate, asserting no errors at any stage.
    fn compile(source: &str) -> Vec<String> {
        let lexed = tokenize(source);
        assert!(lexed.errors.is_empty(), "Lexer errors: {:?}", lexed.errors);
        let program = parse(&lexed.tokens).expect("parse failed");
        generate(&program).expect("codegen failed").lines()
    }

    fn compile_err(source: &str) -> SemanticError {
        let lexed = tokenize(source);
        assert!(lexed.errors.is_empty(), "Lexer errors: {:?}", lexed.errors);
        let program = parse(&lexed.tokens).expect("parse failed");
        generate(&program).expect_err("codegen unexpectedly succeeded")
    }

    /// Every JUMP/JZ/PUSHA operand must name a label defined exactly once.
    fn assert_labels_consistent(lines: &[String]) {
        let mut defined: HashMap<&str, usize> = HashMap::new();
        for line in lines {
            if let Some(name) = line.strip_suffix(':') {
                *defined.entry(name).or_insert(0) += 1;
            }
        }
        for line in lines {
            let target = line
                .strip_prefix("JUMP ")
                .or_else(|| line.strip_prefix("JZ "))
                .or_else(|| line.strip_prefix("PUSHA "));
            if let Some(target) = target {
                assert_eq!(
                    defined.get(target),
                    Some(&1),
                    "target '{}' not defined exactly once in {:?}",
                    target,
                    lines
                );
            }
        }
    }

    #[test]
    fn hello() {
        assert_eq!(
            compile("program hi; begin writeln('hello') end."),
            vec!["PUSHS \"hello\"", "WRITES", "WRITELN", "STOP"]
        );
    }

    #[test]
    fn assignment_and_arithmetic() {
        assert_eq!(
            compile("program s; var a,b:integer; begin a:=3; b:=a+4*2; writeln(b) end."),
            vec![
                "PUSHN 1", "PUSHN 1", "PUSHI 3", "STOREG 0", "PUSHG 0", "PUSHI 4", "PUSHI 2",
                "MUL", "ADD", "STOREG 1", "PUSHG 1", "WRITEI", "WRITELN", "STOP"
            ]
        );
    }

    #[test]
    fn if_else_control_structure() {
        let lines = compile(
            "program c; var x:integer; \
             begin x:=5; if x>0 then writeln('pos') else writeln('neg') end.",
        );
        assert_eq!(
            lines,
            vec![
                "PUSHN 1",
                "PUSHI 5",
                "STOREG 0",
                "PUSHG 0",
                "PUSHI 0",
                "SUP",
                "JZ else0",
                "PUSHS \"pos\"",
                "WRITES",
                "WRITELN",
                "JUMP endif1",
                "else0:",
                "PUSHS \"neg\"",
                "WRITES",
                "WRITELN",
                "endif1:",
                "STOP"
            ]
        );
        assert_labels_consistent(&lines);
    }

    #[test]
    fn if_without_else_uses_single_label() {
        let lines = compile("program c; var x:integer; begin if x=0 then x:=1 end.");
        assert_eq!(
            lines,
            vec![
                "PUSHN 1", "PUSHG 0", "PUSHI 0", "EQUAL", "JZ endif0", "PUSHI 1", "STOREG 0",
                "endif0:", "STOP"
            ]
        );
    }

    #[test]
    fn while_loop() {
        let lines = compile(
            "program w; var i:integer; \
             begin i:=1; while i<=3 do begin writeln(i); i:=i+1 end end.",
        );
        assert_eq!(
            lines,
            vec![
                "PUSHN 1",
                "PUSHI 1",
                "STOREG 0",
                "while0:",
                "PUSHG 0",
                "PUSHI 3",
                "INFEQ",
                "JZ endwhile1",
                "PUSHG 0",
                "WRITEI",
                "WRITELN",
                "PUSHG 0",
                "PUSHI 1",
                "ADD",
                "STOREG 0",
                "JUMP while0",
                "endwhile1:",
                "STOP"
            ]
        );
        assert_labels_consistent(&lines);
    }

    #[test]
    fn for_downto_with_array() {
        let lines = compile(
            "program f; var v:array[1..3] of integer; i:integer;\n\
             begin v[1]:=10; v[2]:=20; v[3]:=30; for i:=3 downto 1 do writeln(v[i]) end.",
        );
        assert_eq!(
            lines,
            vec![
                "PUSHN 3",
                "PUSHN 1",
                // v[1] := 10
                "PUSHI 10",
                "PUSHI 1",
                "PUSHI 1",
                "SUB",
                "PUSHI 0",
                "ADD",
                "STOREN",
                // v[2] := 20
                "PUSHI 20",
                "PUSHI 2",
                "PUSHI 1",
                "SUB",
                "PUSHI 0",
                "ADD",
                "STOREN",
                // v[3] := 30
                "PUSHI 30",
                "PUSHI 3",
                "PUSHI 1",
                "SUB",
                "PUSHI 0",
                "ADD",
                "STOREN",
                // for header: i at 3, limit slot at 4
                "PUSHI 3",
                "STOREG 3",
                "PUSHN 1",
                "PUSHI 1",
                "STOREG 4",
                "for0:",
                "PUSHG 3",
                "PUSHG 4",
                "SUPEQ",
                "JZ endfor1",
                // writeln(v[i])
                "PUSHG 3",
                "PUSHI 1",
                "SUB",
                "PUSHI 0",
                "ADD",
                "LOADN",
                "WRITEI",
                "WRITELN",
                // decrement
                "PUSHG 3",
                "PUSHI 1",
                "SUB",
                "STOREG 3",
                "JUMP for0",
                "endfor1:",
                "STOP"
            ]
        );
        assert_labels_consistent(&lines);
    }

    #[test]
    fn for_to_counts_up() {
        let lines = compile("program f; var i:integer; begin for i:=1 to 3 do writeln(i) end.");
        assert!(lines.contains(&"INFEQ".to_string()));
        assert!(lines.contains(&"ADD".to_string()));
        assert!(!lines.contains(&"SUPEQ".to_string()));
        assert_labels_consistent(&lines);
    }

    #[test]
    fn procedure_wrapped_by_skip_jump() {
        let lines = compile(
            "program p; procedure greet; begin writeln('hi') end;\n\
             begin greet end.",
        );
        assert_eq!(
            lines,
            vec![
                "JUMP skipproc1",
                "procgreet0:",
                "PUSHS \"hi\"",
                "WRITES",
                "WRITELN",
                "RETURN",
                "skipproc1:",
                "PUSHA procgreet0",
                "CALL",
                "STOP"
            ]
        );
        assert_labels_consistent(&lines);
    }

    #[test]
    fn procedure_local_vars_share_global_segment() {
        let lines = compile(
            "program p; var a:integer; \
             procedure inc; var t:integer; begin t:=a; a:=t+1 end; \
             begin inc; writeln(a) end.",
        );
        // a at 0, t at 1; t's reservation precedes the skip jump.
        assert_eq!(lines[0], "PUSHN 1");
        assert_eq!(lines[1], "PUSHN 1");
        assert_eq!(lines[2], "JUMP skipproc1");
        assert!(lines.contains(&"STOREG 1".to_string()));
        assert_labels_consistent(&lines);
    }

    #[test]
    fn recursive_procedure_resolves() {
        let lines = compile(
            "program p; var n:integer; \
             procedure count; begin if n>0 then begin n:=n-1; count end end; \
             begin n:=3; count end.",
        );
        assert_labels_consistent(&lines);
        assert_eq!(lines.iter().filter(|l| *l == "CALL").count(), 2);
    }

    #[test]
    fn forward_procedure_call_fails() {
        let err = compile_err(
            "program p; \
             procedure first; begin second end; \
             procedure second; begin writeln('x') end; \
             begin first end.",
        );
        assert_eq!(
            err,
            SemanticError::UndeclaredProcedure {
                name: "second".into()
            }
        );
    }

    #[test]
    fn boolean_literals_push_ints() {
        assert_eq!(
            compile("program b; var f:boolean; begin f:=true; writeln(f, false) end."),
            vec![
                "PUSHN 1", "PUSHI 1", "STOREG 0", "PUSHG 0", "WRITEI", "PUSHI 0", "WRITEI",
                "WRITELN", "STOP"
            ]
        );
    }

    #[test]
    fn not_equal_lowered_as_equal_not() {
        let lines = compile("program n; var x:integer; begin if x<>0 then writeln(x) end.");
        let pos = lines.iter().position(|l| l == "EQUAL").unwrap();
        assert_eq!(lines[pos + 1], "NOT");
    }

    #[test]
    fn real_operand_selects_float_opcodes() {
        let lines = compile(
            "program r; var x:real; y:real; \
             begin readln(x); y:=x*2; if y>10 then writeln(y) end.",
        );
        assert!(lines.contains(&"FMUL".to_string()));
        assert!(lines.contains(&"FSUP".to_string()));
        assert!(lines.contains(&"WRITEF".to_string()));
        assert!(!lines.contains(&"MUL".to_string()));
    }

    #[test]
    fn div_and_mod_stay_integer_with_real_operands() {
        let lines = compile(
            "program d; var x:real; n:integer; begin readln(x); n:=x div 2; n:=x mod 2 end.",
        );
        assert!(lines.contains(&"DIV".to_string()));
        assert!(lines.contains(&"MOD".to_string()));
        assert!(!lines.contains(&"FDIV".to_string()));
    }

    #[test]
    fn integer_slash_uses_div() {
        let lines = compile("program d; var n:integer; begin n:=7/2 end.");
        assert!(lines.contains(&"DIV".to_string()));
    }

    #[test]
    fn readln_conversions_per_type() {
        let lines = compile(
            "program r; var i:integer; x:real; s:string; b:boolean; \
             begin readln(i); readln(x); readln(s); readln(b) end.",
        );
        assert_eq!(
            lines,
            vec![
                "PUSHN 1", "PUSHN 1", "PUSHN 1", "PUSHN 1", "READ", "ATOI", "STOREG 0", "READ",
                "ATOF", "STOREG 1", "READ", "STOREG 2", "READ", "ATOI", "STOREG 3", "STOP"
            ]
        );
    }

    #[test]
    fn readln_into_array_element() {
        let lines =
            compile("program r; var v:array[5..7] of integer; begin readln(v[6]) end.");
        assert_eq!(
            lines,
            vec![
                "PUSHN 3", "READ", "ATOI", "PUSHI 6", "PUSHI 5", "SUB", "PUSHI 0", "ADD",
                "STOREN", "STOP"
            ]
        );
    }

    #[test]
    fn redeclaration_keeps_first_slot() {
        let lines = compile("program d; var a,a:integer; begin a:=1 end.");
        assert_eq!(
            lines,
            vec!["PUSHN 1", "PUSHI 1", "STOREG 0", "STOP"]
        );
    }

    #[test]
    fn undeclared_assignment_target() {
        assert_eq!(
            compile_err("program e; begin x:=1 end."),
            SemanticError::UndeclaredIdentifier { name: "x".into() }
        );
    }

    #[test]
    fn undeclared_name_in_writeln_is_an_error() {
        // A misspelled variable must not silently lower as a string literal.
        assert_eq!(
            compile_err("program e; var x:integer; begin writeln(y) end."),
            SemanticError::UndeclaredIdentifier { name: "y".into() }
        );
    }

    #[test]
    fn indexing_a_scalar_fails() {
        assert_eq!(
            compile_err("program e; var x:integer; begin x[1]:=2 end."),
            SemanticError::NotAnArray { name: "x".into() }
        );
    }

    #[test]
    fn unknown_procedure_call() {
        assert_eq!(
            compile_err("program e; begin launch end."),
            SemanticError::UndeclaredProcedure {
                name: "launch".into()
            }
        );
    }

    #[test]
    fn undeclared_for_variable() {
        assert_eq!(
            compile_err("program e; begin for i:=1 to 3 do writeln(i) end."),
            SemanticError::UndeclaredIdentifier { name: "i".into() }
        );
    }

    #[test]
    fn buffer_ends_with_single_stop() {
        let sources = [
            "program a; begin writeln('x') end.",
            "program b; var i:integer; begin for i:=1 to 2 do writeln(i) end.",
            "program c; procedure p; begin writeln('y') end; begin p end.",
        ];
        for source in sources {
            let lines = compile(source);
            assert_eq!(lines.last().unwrap(), "STOP");
            assert_eq!(lines.iter().filter(|l| *l == "STOP").count(), 1);
        }
    }

    #[test]
    fn compilation_is_deterministic() {
        let source = "program f; var v:array[1..3] of integer; i:integer;\n\
                      begin v[1]:=10; for i:=3 downto 1 do writeln(v[i]) end.";
        assert_eq!(compile(source), compile(source));
    }

    #[test]
    fn labels_unique_across_nested_constructs() {
        let lines = compile(
            "program n; var i:integer; j:integer; \
             begin \
               while i<10 do \
                 if i mod 2 = 0 then \
                   for j:=1 to i do writeln(j) \
                 else \
                   i:=i+1 \
             end.",
        );
        assert_labels_consistent(&lines);
    }
}
