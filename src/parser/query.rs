use crate::config::NamingScheme;
use crate::symbols::{
    extract_locals, resolve_variable, ArgType, FunctionSignature, LocalVariable, SymbolError,
};
use thiserror::Error;

/// Why a command's query blocks could not be translated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("query block at offset {offset} is never closed")]
    Unterminated { offset: usize },

    #[error("query block at offset {offset} contains another query block")]
    NestedSentinel { offset: usize },

    #[error("malformed query `{query}`: {reason}")]
    Malformed { query: String, reason: &'static str },

    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error("no live variable matches `{0}`")]
    UnresolvedVariable(String),
}

/// A `*sac(...)` region of a command. `start` is the offset of the sentinel,
/// `end` the offset of the closing parenthesis, `inner` the text between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBlock {
    pub start: usize,
    pub end: usize,
    pub inner: String,
}

/// Find every query block opened by `opener` (sentinel plus `(`).
///
/// Blocks do not overlap; a block's body runs to the parenthesis that
/// balances the opener.
pub fn extract_blocks(text: &str, opener: &str) -> Result<Vec<QueryBlock>, QueryError> {
    let mut blocks = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find(opener) {
        let start = cursor + offset;
        let body = start + opener.len();

        let end = matching_paren(&text[body..])
            .map(|i| body + i)
            .ok_or(QueryError::Unterminated { offset: start })?;

        let inner = &text[body..end];
        if inner.contains(opener) {
            return Err(QueryError::NestedSentinel { offset: start });
        }

        blocks.push(QueryBlock {
            start,
            end,
            inner: inner.to_string(),
        });
        cursor = end + 1;
    }

    Ok(blocks)
}

/// Offset of the `)` that brings the depth (starting at 1) back to zero.
fn matching_paren(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Body of a query block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// `x` - the live instance of a local.
    Variable(String),
    /// `[ns::]name(type, ...)` - an overloaded function.
    Function(FunctionSignature),
}

impl Query {
    pub fn parse(inner: &str) -> Result<Self, QueryError> {
        let body = inner.trim();
        let malformed = |reason| QueryError::Malformed {
            query: body.to_string(),
            reason,
        };

        let Some(open) = body.find('(') else {
            if body.contains(')') {
                return Err(malformed("unexpected `)`"));
            }
            check_identifier(body).map_err(malformed)?;
            return Ok(Query::Variable(body.to_string()));
        };

        if open == 0 {
            return Err(malformed("missing function name"));
        }

        let after = &body[open + 1..];
        let close = after.find(')').ok_or_else(|| malformed("missing `)`"))?;
        let arg_text = &after[..close];
        if arg_text.contains('(') {
            return Err(malformed("nested parentheses in argument list"));
        }
        if !after[close + 1..].trim().is_empty() {
            return Err(malformed("text after argument list"));
        }

        let head = body[..open].trim();
        let (namespace, name) = match head.split_once("::") {
            Some((namespace, name)) => (Some(namespace.trim()), name.trim()),
            None => (None, head),
        };
        if let Some(namespace) = namespace {
            check_identifier(namespace).map_err(malformed)?;
        }
        check_identifier(name).map_err(malformed)?;

        let args = arg_text
            .split(',')
            .map(str::trim)
            .filter(|arg| !arg.is_empty())
            .map(ArgType::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Query::Function(FunctionSignature {
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
            args,
        }))
    }

    /// The low-level name this query stands for.
    pub fn resolve(
        &self,
        scheme: &NamingScheme,
        locals: &[LocalVariable],
    ) -> Result<String, QueryError> {
        match self {
            Query::Variable(short) => resolve_variable(short, locals)
                .map(str::to_string)
                .ok_or_else(|| QueryError::UnresolvedVariable(short.clone())),
            Query::Function(signature) => Ok(signature.mangle(scheme)?),
        }
    }
}

fn check_identifier(ident: &str) -> Result<(), &'static str> {
    match ident.chars().next() {
        None => Err("empty identifier"),
        Some(c) if c.is_ascii_digit() => Err("identifier starts with a digit"),
        Some(_) if !ident.chars().all(|c| c.is_alphanumeric() || c == '_') => {
            Err("invalid character in identifier")
        }
        Some(_) => Ok(()),
    }
}

/// Replace each block (sentinel through closing parenthesis) with its
/// resolution, keeping the text around and between blocks. Fails as a whole
/// if any block fails.
pub fn substitute(
    scheme: &NamingScheme,
    text: &str,
    blocks: &[QueryBlock],
    locals: &[LocalVariable],
) -> Result<String, QueryError> {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for block in blocks {
        let resolved = Query::parse(&block.inner)?.resolve(scheme, locals)?;
        out.push_str(&text[cursor..block.start]);
        out.push_str(&resolved);
        cursor = block.end + 1;
    }
    out.push_str(&text[cursor..]);

    Ok(out)
}

/// Extract and substitute in one go against a raw locals dump.
pub fn translate_command(
    scheme: &NamingScheme,
    text: &str,
    locals_dump: &str,
) -> Result<String, QueryError> {
    let blocks = extract_blocks(text, &scheme.block_opener())?;
    if blocks.is_empty() {
        return Ok(text.to_string());
    }
    let locals = extract_locals(scheme, locals_dump);
    substitute(scheme, text, &blocks, &locals)
}
