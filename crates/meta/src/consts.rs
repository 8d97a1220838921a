use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

regex!(METADATA_BLOCK_REGEX, r"(?s)/\*\s*==UserStyle==(.*?)==/UserStyle==\s*\*/");
// type, name, label (quoted or bare), default (rest of line)
regex!(VAR_REGEX, r#"^(\S+)\s+([\w-]+)\s+("(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'|\S+)\s+(.+)$"#);
regex!(PLACEHOLDER_REGEX, r"/\*\[\[([\w-]+)\]\]\*/");
regex!(COMMENT_REGEX, r"(?s)/\*.*?\*/");
