//! Source scanning for the devnet compiler.
//!
//! This is not a compiler. It finds the main contract, reads its entry point
//! signatures and type declarations, and checks that every include is
//! available. Entry points other than `init` must annotate their return
//! type, since nothing here infers types.

use harness_aci::{ArgumentAci, FunctionAci, TypeDesc, INIT};
use harness_rpc::{
    include_directives, is_stdlib_include, CompilerMessage, RpcError, RpcResult, SourcePos,
};
use regex::Regex;
use serde_json::{json, Value as Json};
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

const CONTRACT_PATTERN: &str = r"(?m)^([ \t]*)((?:(?:main|payable)[ \t]+)*)contract[ \t]+(interface[ \t]+)?([A-Za-z_][A-Za-z0-9_']*)[^=\n]*=[ \t]*$";
const ENTRYPOINT_PATTERN: &str =
    r"(?m)^[ \t]*((?:(?:payable|stateful)[ \t]+)*)entrypoint[ \t]+([A-Za-z_][A-Za-z0-9_']*)[ \t]*\(";
const TYPEDEF_PATTERN: &str = r"(?m)^[ \t]*(type|record)[ \t]+([A-Za-z_][A-Za-z0-9_']*)[ \t]*=";

/// The main contract of a source, as far as the scanner understands it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedContract {
    pub name: String,
    pub functions: Vec<FunctionAci>,
    /// `type` aliases and records declared in the contract body.
    pub typedefs: Vec<(String, TypeDesc)>,
}

impl ScannedContract {
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&FunctionAci> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// ACI declaration list in the compiler's JSON shape.
    #[must_use]
    pub fn aci_json(&self) -> Json {
        let typedefs: Vec<Json> = self
            .typedefs
            .iter()
            .map(|(name, ty)| json!({ "name": name, "typedef": ty.to_aci_json(), "vars": [] }))
            .collect();
        let functions: Vec<Json> = self
            .functions
            .iter()
            .map(|f| {
                json!({
                    "name": f.name,
                    "arguments": f
                        .arguments
                        .iter()
                        .map(|a| json!({ "name": a.name, "type": a.ty.to_aci_json() }))
                        .collect::<Vec<_>>(),
                    "returns": f.returns.to_aci_json(),
                    "stateful": f.stateful,
                    "payable": f.payable,
                })
            })
            .collect();
        json!([{
            "contract": {
                "name": self.name,
                "kind": "contract_main",
                "payable": false,
                "typedefs": typedefs,
                "functions": functions,
            }
        }])
    }
}

fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> RpcResult<&'static Regex> {
    if let Some(regex) = cell.get() {
        return Ok(regex);
    }
    let regex = Regex::new(pattern)
        .map_err(|e| RpcError::invalid_params(format!("scanner pattern: {e}")))?;
    Ok(cell.get_or_init(|| regex))
}

fn contract_regex() -> RpcResult<&'static Regex> {
    static CELL: OnceLock<Regex> = OnceLock::new();
    cached(&CELL, CONTRACT_PATTERN)
}

fn entrypoint_regex() -> RpcResult<&'static Regex> {
    static CELL: OnceLock<Regex> = OnceLock::new();
    cached(&CELL, ENTRYPOINT_PATTERN)
}

fn typedef_regex() -> RpcResult<&'static Regex> {
    static CELL: OnceLock<Regex> = OnceLock::new();
    cached(&CELL, TYPEDEF_PATTERN)
}

/// Scans `code` with its include map.
///
/// # Errors
///
/// `RpcError::Compile` with `include_error`, `parse_error` or `type_error`
/// messages, the way the compiler service reports them.
pub fn scan(code: &str, file_system: &BTreeMap<String, String>) -> RpcResult<ScannedContract> {
    let mut messages = check_includes(code, file_system)?;
    if !messages.is_empty() {
        return Err(RpcError::Compile { messages });
    }

    let text = strip_comments(code);
    let Some(contract) = main_contract(&text)? else {
        messages.push(message("parse_error", &text, 0, "No contract declared"));
        return Err(RpcError::Compile { messages });
    };
    let body = &text[contract.body_start..contract.body_end];

    let typedefs = scan_typedefs(&text, contract.body_start, body, &mut messages)?;
    let has_state = typedefs.iter().any(|(name, _)| name == "state");
    let functions = scan_entrypoints(
        &text,
        contract.body_start,
        body,
        &contract.name,
        has_state,
        &mut messages,
    )?;

    if !messages.is_empty() {
        return Err(RpcError::Compile { messages });
    }
    Ok(ScannedContract {
        name: contract.name,
        functions,
        typedefs,
    })
}

fn check_includes(
    code: &str,
    file_system: &BTreeMap<String, String>,
) -> RpcResult<Vec<CompilerMessage>> {
    let mut messages = Vec::new();
    let mut visited = HashSet::new();
    let mut pending: Vec<(Option<&str>, &str)> = vec![(None, code)];

    while let Some((file, source)) = pending.pop() {
        let text = strip_comments(source);
        for include in include_directives(&text)? {
            if let Some((path, included)) = file_system.get_key_value(&include) {
                if visited.insert(path.as_str()) {
                    pending.push((Some(path.as_str()), included.as_str()));
                }
            } else if !is_stdlib_include(&include) {
                let offset = text.find(&format!("\"{include}\"")).unwrap_or(0);
                let mut msg = message(
                    "include_error",
                    &text,
                    offset,
                    &format!("Couldn't find include file '{include}'"),
                );
                msg.pos.file = file.map(ToString::to_string);
                messages.push(msg);
            }
        }
    }
    Ok(messages)
}

struct ContractDecl {
    name: String,
    is_main: bool,
    is_interface: bool,
    body_start: usize,
    body_end: usize,
}

fn main_contract(text: &str) -> RpcResult<Option<ContractDecl>> {
    let decls: Vec<ContractDecl> = contract_regex()?
        .captures_iter(text)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let indent = cap.get(1).map_or(0, |m| m.as_str().len());
            let body_start = whole.end();
            Some(ContractDecl {
                name: cap.get(4)?.as_str().to_string(),
                is_main: cap.get(2).is_some_and(|m| m.as_str().contains("main")),
                is_interface: cap.get(3).is_some(),
                body_start,
                body_end: block_end(text, body_start, indent),
            })
        })
        .collect();

    let has_body = |d: &ContractDecl| !text[d.body_start..d.body_end].trim().is_empty();
    let mut fallback = None;
    for decl in decls {
        if decl.is_main {
            return Ok(Some(decl));
        }
        if !decl.is_interface && has_body(&decl) {
            fallback = Some(decl);
        }
    }
    Ok(fallback)
}

/// End of the indented block opened by a declaration at `indent`.
fn block_end(text: &str, start: usize, indent: usize) -> usize {
    let mut offset = start;
    for line in text[start..].split_inclusive('\n') {
        let trimmed = line.trim_start_matches([' ', '\t']);
        let blank = trimmed.trim().is_empty();
        // the header line itself ends at `start`, so the first chunk is its newline
        if offset > start && !blank && line.len() - trimmed.len() <= indent {
            return offset;
        }
        offset += line.len();
    }
    text.len()
}

fn scan_typedefs(
    text: &str,
    base: usize,
    body: &str,
    messages: &mut Vec<CompilerMessage>,
) -> RpcResult<Vec<(String, TypeDesc)>> {
    let mut typedefs = Vec::new();
    for cap in typedef_regex()?.captures_iter(body) {
        let (Some(whole), Some(kind), Some(name)) = (cap.get(0), cap.get(1), cap.get(2)) else {
            continue;
        };
        let rest = &body[whole.end()..];
        let parsed = if kind.as_str() == "record" {
            parse_record(rest)
        } else {
            let line = rest.split('\n').next().unwrap_or_default();
            TypeDesc::parse(line.trim()).map_err(|e| e.to_string())
        };
        match parsed {
            Ok(ty) => typedefs.push((name.as_str().to_string(), ty)),
            Err(err) => messages.push(message(
                "type_error",
                text,
                base + whole.start(),
                &format!("Cannot read type '{}': {err}", name.as_str()),
            )),
        }
    }
    Ok(typedefs)
}

fn parse_record(rest: &str) -> Result<TypeDesc, String> {
    let open = rest
        .find('{')
        .filter(|i| rest[..*i].trim().is_empty())
        .ok_or_else(|| "expected '{'".to_string())?;
    let close = matching(rest, open, '{', '}').ok_or_else(|| "unclosed record".to_string())?;
    split_top_level(&rest[open + 1..close])
        .into_iter()
        .filter(|field| !field.trim().is_empty())
        .map(|field| {
            let (name, ty) = field
                .split_once(':')
                .ok_or_else(|| format!("field '{}' has no type", field.trim()))?;
            let ty = TypeDesc::parse(ty.trim()).map_err(|e| e.to_string())?;
            Ok((name.trim().to_string(), ty))
        })
        .collect::<Result<Vec<_>, String>>()
        .map(TypeDesc::Record)
}

fn scan_entrypoints(
    text: &str,
    base: usize,
    body: &str,
    contract: &str,
    has_state: bool,
    messages: &mut Vec<CompilerMessage>,
) -> RpcResult<Vec<FunctionAci>> {
    let mut functions: Vec<FunctionAci> = Vec::new();
    for cap in entrypoint_regex()?.captures_iter(body) {
        let (Some(whole), Some(name)) = (cap.get(0), cap.get(2)) else {
            continue;
        };
        let name = name.as_str();
        let modifiers = cap.get(1).map_or("", |m| m.as_str());
        let at = base + whole.start();
        let fail = |messages: &mut Vec<CompilerMessage>, msg: String| {
            messages.push(message("type_error", text, at, &msg));
        };

        if functions.iter().any(|f| f.name == name) {
            fail(messages, format!("Duplicate definition of '{name}'"));
            continue;
        }

        let open = whole.end() - 1;
        let Some(close) = matching(body, open, '(', ')') else {
            messages.push(message("parse_error", text, at, "Unclosed argument list"));
            continue;
        };

        let mut arguments = Vec::new();
        let mut bad_argument = false;
        for arg in split_top_level(&body[open + 1..close]) {
            if arg.trim().is_empty() {
                continue;
            }
            let Some((arg_name, ty)) = arg.split_once(':') else {
                fail(
                    messages,
                    format!(
                        "Missing type annotation for argument '{}' of '{name}'",
                        arg.trim()
                    ),
                );
                bad_argument = true;
                continue;
            };
            match TypeDesc::parse(ty.trim()) {
                Ok(ty) => arguments.push(ArgumentAci {
                    name: arg_name.trim().to_string(),
                    ty,
                }),
                Err(err) => {
                    fail(messages, err.to_string());
                    bad_argument = true;
                }
            }
        }
        if bad_argument {
            continue;
        }

        let returns = match return_annotation(&body[close + 1..]) {
            Some(annotation) => match TypeDesc::parse(annotation) {
                Ok(ty) => ty,
                Err(err) => {
                    fail(messages, err.to_string());
                    continue;
                }
            },
            None if name == INIT && has_state => TypeDesc::Named(format!("{contract}.state")),
            None if name == INIT => TypeDesc::Unit,
            None => {
                fail(
                    messages,
                    format!("Missing return type annotation on entrypoint '{name}'"),
                );
                continue;
            }
        };

        functions.push(FunctionAci {
            name: name.to_string(),
            arguments,
            returns,
            stateful: modifiers.contains("stateful"),
            payable: modifiers.contains("payable"),
        });
    }
    Ok(functions)
}

/// Text between `:` and the `=` that starts the body, if annotated.
fn return_annotation(after_args: &str) -> Option<&str> {
    let rest = after_args.trim_start_matches([' ', '\t']);
    let rest = rest.strip_prefix(':')?;
    let mut depth = 0i32;
    let bytes = rest.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' | b'{' => depth += 1,
            b')' | b'}' => depth -= 1,
            b'=' if depth == 0 && bytes.get(i + 1) != Some(&b'>') => {
                return Some(rest[..i].trim());
            }
            _ => {}
        }
    }
    None
}

/// Index of the delimiter closing the one at `open`.
fn matching(text: &str, open: usize, left: char, right: char) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        if c == left {
            depth += 1;
        } else if c == right {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(open + i);
            }
        }
    }
    None
}

fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '{' | '[' => depth += 1,
            ')' | '}' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Blanks out comments, keeping offsets and line breaks.
fn strip_comments(code: &str) -> String {
    let bytes = code.as_bytes();
    let mut out = bytes.to_vec();
    let mut i = 0;
    let mut in_string = false;
    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            match b {
                b'\\' => i += 1,
                b'"' => in_string = false,
                _ => {}
            }
            i += 1;
            continue;
        }
        match (b, bytes.get(i + 1)) {
            (b'"', _) => {
                in_string = true;
                i += 1;
            }
            (b'/', Some(b'/')) => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    out[i] = b' ';
                    i += 1;
                }
            }
            (b'/', Some(b'*')) => {
                let mut depth = 0usize;
                while i < bytes.len() {
                    if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'*') {
                        depth += 1;
                        out[i] = b' ';
                        out[i + 1] = b' ';
                        i += 2;
                    } else if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                        depth -= 1;
                        out[i] = b' ';
                        out[i + 1] = b' ';
                        i += 2;
                        if depth == 0 {
                            break;
                        }
                    } else {
                        if bytes[i] != b'\n' {
                            out[i] = b' ';
                        }
                        i += 1;
                    }
                }
            }
            _ => i += 1,
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn message(kind: &str, text: &str, offset: usize, msg: &str) -> CompilerMessage {
    let before = &text[..offset.min(text.len())];
    let line = before.matches('\n').count() + 1;
    let col = before.rfind('\n').map_or(before.len(), |nl| before.len() - nl - 1) + 1;
    CompilerMessage {
        kind: kind.to_string(),
        pos: SourcePos {
            file: None,
            line: u32::try_from(line).unwrap_or(u32::MAX),
            col: u32::try_from(col).unwrap_or(u32::MAX),
        },
        message: msg.to_string(),
    }
}
