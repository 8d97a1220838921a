use crate::consts::{METADATA_BLOCK_REGEX, VAR_REGEX};
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use tracing::instrument;
use ucss_model::{UsercssData, Var, VarKind};

const SUPPORTED_PREPROCESSORS: &[&str] = &["default"];

/// Parses the `==UserStyle==` block of a usercss document.
///
/// `@name`, `@namespace` and `@version` are mandatory. Unknown keys are
/// ignored so that newer documents still install.
#[instrument(level = "trace", skip_all)]
pub fn parse_metadata(source: &str) -> Result<UsercssData> {
    let block = METADATA_BLOCK_REGEX
        .captures(source)
        .and_then(|captures| captures.get(1))
        .ok_or_raise(|| ErrorKind::MetadataParse("no ==UserStyle== block found".into()))?;

    let mut data = UsercssData::default();
    let (mut name, mut namespace) = (None, None);
    for line in block.as_str().lines().map(str::trim) {
        let Some(line) = line.strip_prefix('@') else {
            continue;
        };
        let (key, value) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let value = value.trim();
        match key {
            "name" => name = non_empty(value),
            "namespace" => namespace = non_empty(value),
            "version" => data.version = non_empty(value),
            "description" => data.description = non_empty(value),
            "author" => data.author = non_empty(value),
            "homepageURL" => data.homepage_url = non_empty(value),
            "updateURL" => data.update_url = non_empty(value),
            "preprocessor" => data.preprocessor = non_empty(value),
            "var" | "advanced" => {
                let (var_name, var) = parse_var(value)?;
                data.vars.insert(var_name, var);
            },
            _ => tracing::trace!(key, "Ignoring unknown metadata key"),
        }
    }

    data.name = name.ok_or_raise(|| missing("name"))?;
    data.namespace = namespace.ok_or_raise(|| missing("namespace"))?;
    if data.version.is_none() {
        exn::bail!(missing("version"));
    }
    if let Some(preprocessor) = &data.preprocessor
        && !SUPPORTED_PREPROCESSORS.contains(&preprocessor.as_str())
    {
        exn::bail!(ErrorKind::MetadataParse(format!("unsupported preprocessor: {preprocessor}")));
    }
    tracing::trace!(vars = data.vars.len(), "Parsed metadata block");
    Ok(data)
}

fn missing(key: &str) -> ErrorKind {
    ErrorKind::MetadataParse(format!("missing mandatory @{key}"))
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Parses the remainder of an `@var` line: `<type> <name> <label> <default>`.
fn parse_var(line: &str) -> Result<(String, Var)> {
    let captures = VAR_REGEX
        .captures(line)
        .ok_or_raise(|| ErrorKind::MetadataParse(format!("malformed @var declaration: {line}")))?;
    let (keyword, name, label, default) = (&captures[1], &captures[2], &captures[3], captures[4].trim());
    let kind = VarKind::from_keyword(keyword)
        .ok_or_raise(|| ErrorKind::MetadataParse(format!("unknown @var type '{keyword}' for {name}")))?;
    let label = unquote(label);
    let var = match kind {
        VarKind::Select => {
            let raw: Vec<String> = serde_json::from_str(default)
                .or_raise(|| ErrorKind::MetadataParse(format!("select options for {name} must be a JSON array")))?;
            let starred = raw.iter().find_map(|option| option.strip_suffix('*')).map(str::to_string);
            let options: Vec<String> =
                raw.iter().map(|option| option.strip_suffix('*').unwrap_or(option).to_string()).collect();
            let default = starred
                .or_else(|| options.first().cloned())
                .ok_or_raise(|| ErrorKind::MetadataParse(format!("select {name} has no options")))?;
            Var::new(kind, label, default).with_options(options)
        },
        VarKind::Checkbox => match default {
            "0" | "1" => Var::new(kind, label, default),
            _ => exn::bail!(ErrorKind::MetadataParse(format!("checkbox {name} default must be 0 or 1"))),
        },
        VarKind::Number | VarKind::Range => {
            default
                .parse::<f64>()
                .or_raise(|| ErrorKind::MetadataParse(format!("{kind} {name} default must be numeric")))?;
            Var::new(kind, label, default)
        },
        VarKind::Color | VarKind::Text => Var::new(kind, label, unquote(default)),
    };
    Ok((name.to_string(), var))
}

fn unquote(value: &str) -> String {
    for quote in ['"', '\''] {
        if let Some(inner) = value.strip_prefix(quote).and_then(|v| v.strip_suffix(quote)) {
            return inner.replace(&format!("\\{quote}"), &quote.to_string());
        }
    }
    value.to_string()
}
