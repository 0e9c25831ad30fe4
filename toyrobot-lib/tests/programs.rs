//! Runs every script in `test-suite/programs` and checks what it prints.

use glob::glob;
use toyrobot_lib::vm::Vm;

const OUTPUT_MARKER: &str = "### OUTPUT ###\n";

/// splits a script into the program and the output it should produce
fn split_script(content: &str) -> (&str, String) {
    let (program, output) = content
        .split_once(OUTPUT_MARKER)
        .expect("script has no output section");
    let expected = output
        .lines()
        .map(|l| l.strip_prefix("# ").or_else(|| l.strip_prefix('#')).unwrap_or(l))
        .map(|l| format!("{}\n", l))
        .collect();
    (program, expected)
}

#[test]
fn test_whole_programs() {
    let pattern = concat!(env!("CARGO_MANIFEST_DIR"), "/../test-suite/programs/*.bot");
    let scripts: Vec<_> = glob(pattern).unwrap().map(Result::unwrap).collect();
    assert!(!scripts.is_empty(), "no scripts found with {}", pattern);

    for script in scripts {
        let content = std::fs::read_to_string(&script).unwrap();
        let (program, expected) = split_script(&content);
        let mut vm = Vm::with_output(vec![]);
        if let Err(e) = vm.run(program) {
            panic!("{} failed: {}", script.display(), e);
        }
        let got = String::from_utf8(vm.into_output()).unwrap();
        assert_eq!(got, expected, "output of {}", script.display());
    }
}

#[test]
fn test_the_whole_file_is_a_program() {
    // the output section is made of comments, running it changes nothing
    let content = "0 0 NORTH PLACE REPORT\n### OUTPUT ###\n# 0,0,NORTH\n";
    let (program, expected) = split_script(content);
    let mut whole = Vm::with_output(vec![]);
    whole.run(content).unwrap();
    let mut part = Vm::with_output(vec![]);
    part.run(program).unwrap();
    assert_eq!(whole.into_output(), part.into_output());
    assert_eq!(expected, "0,0,NORTH\n");
}
