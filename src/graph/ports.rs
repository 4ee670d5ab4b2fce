/// A parsed port specification: `name` or `name:type`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortSpec {
    pub name: String,
    pub port_type: Option<String>,
}

impl PortSpec {
    /// Splits a spec on `:`. Both parts are trimmed, an empty type counts as
    /// no type, and anything after a second `:` is ignored.
    pub fn parse(spec: &str) -> Self {
        let mut parts = spec.split(':').map(str::trim);
        let name = parts.next().unwrap_or_default().to_string();
        let port_type = parts
            .next()
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        Self { name, port_type }
    }
}

/// Splits a comma-separated port list as typed into the editor.
///
/// ```rust
/// use nagare::graph::parse_port_list;
///
/// assert_eq!(parse_port_list(" a, b:int ,, "), vec!["a", "b:int"]);
/// ```
pub fn parse_port_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|port| !port.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_type() {
        let port = PortSpec::parse(" value : int ");
        assert_eq!(port.name, "value");
        assert_eq!(port.port_type.as_deref(), Some("int"));
    }

    #[test]
    fn empty_type_is_untyped() {
        assert_eq!(PortSpec::parse("flag:").port_type, None);
        assert_eq!(PortSpec::parse("flag").port_type, None);
        assert_eq!(PortSpec::parse("a:b:c").port_type.as_deref(), Some("b"));
    }
}
