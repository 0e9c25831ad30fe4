use anyhow::{anyhow, bail, Context, Result};
use glob::glob;
use std::result::Result as StdResult;

use std::fs;
use toyrobot_lib::vm::Vm;

const OUTPUT_MARKER: &str = "### OUTPUT ###\n";

fn main() -> Result<()> {
    let scripts: Vec<_> = glob("programs/*.bot")?.collect::<StdResult<_, _>>()?;
    let mut failures = 0;
    for script in &scripts {
        let content = fs::read_to_string(script)
            .context(format!("loading script: {}", script.display()))?;
        let (program, expected_output) = split_script(&content)
            .with_context(|| format!("reading script {}", script.display()))?;
        match run(program) {
            Ok(output) if output == expected_output => {
                println!("{}: passed", script.display());
            }
            Ok(output) => {
                failures += 1;
                println!("{}: failed\nactual output:\n{}", script.display(), output);
            }
            Err(e) => {
                failures += 1;
                println!("{}: failed\nerror: {}", script.display(), e);
            }
        }
    }
    if failures > 0 {
        bail!("{} of {} scripts failed", failures, scripts.len());
    }
    Ok(())
}

fn run(program: &str) -> Result<String> {
    let mut vm = Vm::with_output(vec![]);
    vm.run(program)?;
    Ok(String::from_utf8(vm.into_output())?)
}

/// A script is the program, the output marker, then the expected output
/// with every line commented out.
fn split_script(content: &str) -> Result<(&str, String)> {
    let (program, output) = content
        .split_once(OUTPUT_MARKER)
        .ok_or_else(|| anyhow!("missing {:?}", OUTPUT_MARKER.trim_end()))?;
    let expected = output
        .lines()
        .map(|l| l.strip_prefix("# ").or_else(|| l.strip_prefix('#')).unwrap_or(l))
        .map(|l| format!("{}\n", l))
        .collect();
    Ok((program, expected))
}
