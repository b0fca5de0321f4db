use super::locals::LocalVariable;
use super::types::{ArgType, Dimension, FunctionSignature};
use crate::config::NamingScheme;

/// Recover the high-level signature of a mangled function name.
///
/// Only names built from the scheme's type table can be decoded. The
/// namespace comes back uppercased and is omitted for the main namespace.
pub fn demangle_function(scheme: &NamingScheme, mangled: &str) -> Option<FunctionSignature> {
    let rest = mangled.strip_prefix(&scheme.function_marker())?;
    let mut parts = rest.split("__");

    let namespace = parts.next().filter(|s| !s.is_empty())?;
    let name = parts.next().filter(|s| !s.is_empty())?;
    let args = parts
        .map(|part| decode_arg(scheme, part))
        .collect::<Option<Vec<_>>>()?;

    let namespace = (namespace != scheme.main_namespace).then(|| namespace.to_string());

    Some(FunctionSignature {
        namespace,
        name: name.to_string(),
        args,
    })
}

fn decode_arg(scheme: &NamingScheme, encoded: &str) -> Option<ArgType> {
    let mut markers = encoded.split('_');
    let code = markers.next()?;
    let base = scheme.type_name(code)?;
    let open = scheme.open_dimension_marker.as_deref().unwrap_or(code);

    let dims = markers
        .map(|marker| match marker.parse::<u64>() {
            Ok(extent) if extent > 0 => Some(Dimension::Fixed(extent)),
            _ if marker == open => Some(Dimension::Open),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;

    Some(ArgType::array(base, dims))
}

/// Source-level name of a renamed local, with any SSA suffix removed.
pub fn demangle_variable(scheme: &NamingScheme, name: &str) -> Option<String> {
    let local = LocalVariable::classify(scheme, name)?;
    let short = local.designator().split("__SSA").next().unwrap_or("");
    (!short.is_empty()).then(|| short.to_string())
}
