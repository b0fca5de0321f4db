use super::SymbolError;
use std::fmt;
use std::str::FromStr;

/// One array dimension of an argument type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// `int[6]`. Extents beyond `u64` are rejected.
    Fixed(u64),
    /// `int[]`, `int[.]`, `int[*]`
    Open,
}

impl Dimension {
    fn parse(content: &str, arg: &str) -> Result<Self, SymbolError> {
        let content = content.trim();

        if !content.is_empty() && content.bytes().all(|b| b.is_ascii_digit()) {
            return match content.parse::<u64>() {
                Ok(0) => Ok(Dimension::Open),
                Ok(extent) => Ok(Dimension::Fixed(extent)),
                Err(_) => Err(SymbolError::BadDimension {
                    arg: arg.to_string(),
                    dimension: content.to_string(),
                }),
            };
        }

        // Shape wildcards are at most a couple of characters (`.`, `*`, `+`).
        if content.chars().count() < 3 {
            Ok(Dimension::Open)
        } else {
            Err(SymbolError::BadDimension {
                arg: arg.to_string(),
                dimension: content.to_string(),
            })
        }
    }
}

/// A function argument type as written in a query: `int`, `float[]`,
/// `int[][6]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgType {
    pub base: String,
    pub dims: Vec<Dimension>,
}

impl ArgType {
    pub fn scalar(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            dims: Vec::new(),
        }
    }

    pub fn array(base: impl Into<String>, dims: Vec<Dimension>) -> Self {
        Self {
            base: base.into(),
            dims,
        }
    }

    /// Parse the textual form. Bracket groups are read left to right and
    /// keep that order in `dims`.
    pub fn parse(text: &str) -> Result<Self, SymbolError> {
        let text = text.trim();
        let (base, mut rest) = match text.find('[') {
            Some(i) => (text[..i].trim(), &text[i..]),
            None => (text, ""),
        };

        if base.is_empty() {
            return Err(SymbolError::EmptyType(text.to_string()));
        }

        let mut dims = Vec::new();
        while !rest.is_empty() {
            if !rest.starts_with('[') {
                return Err(SymbolError::UnbalancedBrackets(text.to_string()));
            }
            let close = matching_bracket(rest)
                .ok_or_else(|| SymbolError::UnbalancedBrackets(text.to_string()))?;
            dims.push(Dimension::parse(&rest[1..close], text)?);
            rest = rest[close + 1..].trim_start();
        }

        Ok(Self::array(base, dims))
    }
}

impl FromStr for ArgType {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        for dim in &self.dims {
            match dim {
                Dimension::Fixed(extent) => write!(f, "[{}]", extent)?,
                Dimension::Open => write!(f, "[]")?,
            }
        }
        Ok(())
    }
}

/// Index of the `]` closing the group opened at `text[0]`.
fn matching_bracket(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, ch) in text.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// A high-level function reference: `[namespace::]name(args)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub namespace: Option<String>,
    pub name: String,
    pub args: Vec<ArgType>,
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(namespace) = &self.namespace {
            write!(f, "{}::", namespace)?;
        }
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_keep_textual_order() {
        let arg = ArgType::parse("int[][6]").unwrap();
        assert_eq!(arg.base, "int");
        assert_eq!(arg.dims, vec![Dimension::Open, Dimension::Fixed(6)]);
    }

    #[test]
    fn shape_wildcards_are_open() {
        assert_eq!(ArgType::parse("int[.]").unwrap().dims, vec![Dimension::Open]);
        assert_eq!(ArgType::parse("int[0]").unwrap().dims, vec![Dimension::Open]);
    }

    #[test]
    fn rejects_malformed_brackets() {
        assert!(matches!(
            ArgType::parse("int[6"),
            Err(SymbolError::UnbalancedBrackets(_))
        ));
        assert!(matches!(
            ArgType::parse("int[]x"),
            Err(SymbolError::UnbalancedBrackets(_))
        ));
        assert!(matches!(
            ArgType::parse("int[abc]"),
            Err(SymbolError::BadDimension { .. })
        ));
        assert!(matches!(ArgType::parse("[3]"), Err(SymbolError::EmptyType(_))));
    }

    #[test]
    fn extents_wider_than_u32() {
        let arg = ArgType::parse("int[4294967296]").unwrap();
        assert_eq!(arg.dims, vec![Dimension::Fixed(4_294_967_296)]);
        assert_eq!(arg.to_string(), "int[4294967296]");
        assert!(matches!(
            ArgType::parse("int[99999999999999999999]"),
            Err(SymbolError::BadDimension { .. })
        ));
    }
}
