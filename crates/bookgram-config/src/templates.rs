//! Configuration template for `bookgram init`.

/// Annotated template listing every setting with its default.
const LOCAL_TEMPLATE: &str = include_str!("../templates/config.toml");

/// Returns the template with every setting commented out except `root`.
pub fn local_template() -> String {
    let mut result = String::with_capacity(LOCAL_TEMPLATE.len() + 256);
    for line in LOCAL_TEMPLATE.lines() {
        let keep = line.is_empty() || line.starts_with('#') || line.starts_with("root");
        if !keep {
            result.push_str("# ");
        }
        result.push_str(line);
        result.push('\n');
    }
    result
}
