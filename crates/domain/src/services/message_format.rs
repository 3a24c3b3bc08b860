/// 按 printf 风格把参数代入事件消息
///
/// 支持 `%s` `%v` `%d` `%q` 与 `%%`。参数不足时输出 `%!s(MISSING)`，
/// 多余的参数追加为 `%!(EXTRA a, b)`。
pub fn format_message(format: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut args_iter = args.iter();
    let mut chars = format.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some(verb @ ('s' | 'v' | 'd' | 'q')) => match args_iter.next() {
                Some(arg) if verb == 'q' => out.push_str(&format!("{arg:?}")),
                Some(arg) => out.push_str(arg),
                None => {
                    out.push_str("%!");
                    out.push(verb);
                    out.push_str("(MISSING)");
                }
            },
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push_str("%!(NOVERB)"),
        }
    }

    let extra: Vec<&str> = args_iter.map(String::as_str).collect();
    if !extra.is_empty() {
        out.push_str(&format!("%!(EXTRA {})", extra.join(", ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_substitutes_in_order() {
        assert_eq!(
            format_message("test message: %s", &args(&["a1"])),
            "test message: a1"
        );
        assert_eq!(
            format_message("%s processed %d items (%v)", &args(&["node-1", "42", "ok"])),
            "node-1 processed 42 items (ok)"
        );
    }

    #[test]
    fn test_quoted_and_literal_percent() {
        assert_eq!(format_message("name=%q", &args(&["a b"])), "name=\"a b\"");
        assert_eq!(format_message("100%% done", &[]), "100% done");
    }

    #[test]
    fn test_missing_and_extra_args() {
        assert_eq!(format_message("%s and %s", &args(&["one"])), "one and %!s(MISSING)");
        assert_eq!(
            format_message("only %s", &args(&["one", "two", "three"])),
            "only one%!(EXTRA two, three)"
        );
    }

    #[test]
    fn test_unknown_verb_and_trailing_percent() {
        assert_eq!(format_message("%x", &[]), "%x");
        assert_eq!(format_message("50%", &[]), "50%!(NOVERB)");
    }
}
