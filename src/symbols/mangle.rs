use super::types::{ArgType, Dimension, FunctionSignature};
use super::SymbolError;
use crate::config::NamingScheme;

impl NamingScheme {
    pub fn type_code(&self, type_name: &str) -> Result<&str, SymbolError> {
        self.type_codes
            .get(type_name)
            .map(String::as_str)
            .ok_or_else(|| SymbolError::UnknownType(type_name.to_string()))
    }

    pub fn type_name(&self, code: &str) -> Option<&str> {
        self.type_codes
            .iter()
            .find(|(_, c)| c.as_str() == code)
            .map(|(name, _)| name.as_str())
    }

    fn open_marker<'a>(&'a self, element_code: &'a str) -> &'a str {
        self.open_dimension_marker.as_deref().unwrap_or(element_code)
    }
}

/// Encode a function reference into its overloaded C symbol.
///
/// `SACf__<NAMESPACE>__<name>` followed by `__<code>` per argument, with one
/// `_<marker>` per array dimension. The namespace is uppercased and defaults
/// to the scheme's main namespace. Any unknown type fails the whole name.
pub fn mangle(
    scheme: &NamingScheme,
    namespace: Option<&str>,
    name: &str,
    args: &[ArgType],
) -> Result<String, SymbolError> {
    let namespace = namespace
        .map(str::to_uppercase)
        .unwrap_or_else(|| scheme.main_namespace.clone());

    let mut mangled = format!("{}{}__{}", scheme.function_marker(), namespace, name);

    for arg in args {
        let code = scheme.type_code(&arg.base)?;
        mangled.push_str("__");
        mangled.push_str(code);

        for dim in &arg.dims {
            mangled.push('_');
            match dim {
                Dimension::Fixed(extent) => mangled.push_str(&extent.to_string()),
                Dimension::Open => mangled.push_str(scheme.open_marker(code)),
            }
        }
    }

    Ok(mangled)
}

impl FunctionSignature {
    pub fn mangle(&self, scheme: &NamingScheme) -> Result<String, SymbolError> {
        mangle(scheme, self.namespace.as_deref(), &self.name, &self.args)
    }
}
