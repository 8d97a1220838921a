use crate::consts::{COMMENT_REGEX, METADATA_BLOCK_REGEX, PLACEHOLDER_REGEX};
use crate::error::{ErrorKind, Result};
use exn::OptionExt;
use std::fmt::Write;
use ucss_model::{Section, Style, VariableSet};

/// Compiles a resolved style with the `default` preprocessor.
pub(crate) fn compile(mut style: Style) -> Result<Style> {
    let source = style.source_code.as_deref().ok_or_raise(|| ErrorKind::Compile("missing source code".into()))?;
    let data = style.usercss_data.as_ref().ok_or_raise(|| ErrorKind::Compile("missing usercss metadata".into()))?;

    let body = METADATA_BLOCK_REGEX.replace(source, "");
    let body = body.trim();
    // Substituted values may contain braces of their own.
    check_braces(body)?;
    let body = substitute_placeholders(body, &data.vars)?;

    let mut code = root_block(&data.vars);
    code.push_str(&body);
    style.sections = vec![Section { code }];
    Ok(style)
}

/// Replaces every `/*[[name]]*/` with the variable's current value.
fn substitute_placeholders(body: &str, vars: &VariableSet) -> Result<String> {
    let mut output = String::with_capacity(body.len());
    let mut last = 0;
    for captures in PLACEHOLDER_REGEX.captures_iter(body) {
        // Group 0 always exists for a match.
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let var = vars
            .get(name.as_str())
            .ok_or_raise(|| ErrorKind::Compile(format!("undefined variable: {}", name.as_str())))?;
        output.push_str(&body[last..whole.start()]);
        output.push_str(var.current());
        last = whole.end();
    }
    output.push_str(&body[last..]);
    Ok(output)
}

fn check_braces(body: &str) -> Result<()> {
    let stripped = COMMENT_REGEX.replace_all(body, "");
    let mut depth = 0usize;
    for (line, text) in stripped.lines().enumerate() {
        for c in text.chars() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_raise(|| ErrorKind::Compile(format!("unexpected '}}' on line {}", line + 1)))?;
                },
                _ => {},
            }
        }
    }
    if depth > 0 {
        exn::bail!(ErrorKind::Compile(format!("{depth} unclosed block(s)")));
    }
    Ok(())
}

fn root_block(vars: &VariableSet) -> String {
    if vars.is_empty() {
        return String::new();
    }
    let mut block = String::from(":root {\n");
    for (name, var) in vars {
        // Writing into a String never fails.
        _ = writeln!(block, "  --{name}: {};", var.current());
    }
    block.push_str("}\n");
    block
}
