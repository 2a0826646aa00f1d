//! Definition scripts.
//!
//! One definition per line, `#` starts a comment:
//!
//! ```text
//! row    = contiguous 4 double
//! column = vector 4 1 4 double
//! pair   = struct [1,1] [0,8] [int,double]
//! ```
//!
//! A base is a builtin name or any earlier definition. Parsing is pure;
//! [`Session::define`] then builds each definition in a [`TypePool`].

use std::fmt;

use dtype_layout::{BasicType, LayoutError, TypeId, TypePool, TypeRef, Units};
use rustc_hash::FxHashMap;

mod range;

/// Error in a definition script, tied to a 1-based line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    pub line: usize,
    pub message: String,
}

impl ScriptError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ScriptError {}

/// Combinator call with its arguments, bases still unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Combinator {
    Contiguous {
        count: u32,
        base: String,
    },
    Vector {
        count: u32,
        blocklength: u32,
        stride: i64,
        base: String,
    },
    Hvector {
        count: u32,
        blocklength: u32,
        stride: i64,
        base: String,
    },
    Indexed {
        blocklengths: Vec<u32>,
        displacements: Vec<i64>,
        base: String,
    },
    Hindexed {
        blocklengths: Vec<u32>,
        displacements: Vec<i64>,
        base: String,
    },
    IndexedBlock {
        blocklength: u32,
        displacements: Vec<i64>,
        base: String,
    },
    HindexedBlock {
        blocklength: u32,
        displacements: Vec<i64>,
        base: String,
    },
    Resized {
        base: String,
        lb: i64,
        extent: i64,
    },
    Dup {
        base: String,
    },
    Struct {
        blocklengths: Vec<u32>,
        displacements: Vec<i64>,
        bases: Vec<String>,
    },
}

/// `name = combinator args...` on one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub line: usize,
    pub name: String,
    pub combinator: Combinator,
}

// === Parsing ===

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Word(&'a str),
    List(Vec<&'a str>),
}

/// Parse a whole script. Stops at the first malformed line.
pub fn parse(source: &str) -> Result<Vec<Definition>, ScriptError> {
    let mut definitions = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let text = raw.split_once('#').map_or(raw, |(code, _)| code).trim();
        if text.is_empty() {
            continue;
        }
        definitions.push(parse_line(line, text)?);
    }

    Ok(definitions)
}

fn parse_line(line: usize, text: &str) -> Result<Definition, ScriptError> {
    let Some((name, call)) = text.split_once('=') else {
        return Err(ScriptError::new(line, "expected `name = combinator ...`"));
    };

    let name = name.trim();
    if !is_identifier(name) {
        return Err(ScriptError::new(line, format!("invalid name `{name}`")));
    }

    let tokens = tokenize(line, call)?;
    let Some((Token::Word(combinator), args)) = tokens.split_first() else {
        return Err(ScriptError::new(line, "missing combinator"));
    };

    let mut args = Args { line, args, next: 0 };
    let combinator = match *combinator {
        "contiguous" => Combinator::Contiguous {
            count: args.scalar("count")?,
            base: args.word("base")?,
        },
        "vector" => Combinator::Vector {
            count: args.scalar("count")?,
            blocklength: args.scalar("blocklength")?,
            stride: args.scalar("stride")?,
            base: args.word("base")?,
        },
        "hvector" => Combinator::Hvector {
            count: args.scalar("count")?,
            blocklength: args.scalar("blocklength")?,
            stride: args.scalar("stride")?,
            base: args.word("base")?,
        },
        "indexed" => Combinator::Indexed {
            blocklengths: args.list("blocklengths")?,
            displacements: args.list("displacements")?,
            base: args.word("base")?,
        },
        "hindexed" => Combinator::Hindexed {
            blocklengths: args.list("blocklengths")?,
            displacements: args.list("displacements")?,
            base: args.word("base")?,
        },
        "indexed_block" => Combinator::IndexedBlock {
            blocklength: args.scalar("blocklength")?,
            displacements: args.list("displacements")?,
            base: args.word("base")?,
        },
        "hindexed_block" => Combinator::HindexedBlock {
            blocklength: args.scalar("blocklength")?,
            displacements: args.list("displacements")?,
            base: args.word("base")?,
        },
        "resized" => Combinator::Resized {
            base: args.word("base")?,
            lb: args.scalar("lb")?,
            extent: args.scalar("extent")?,
        },
        "dup" => Combinator::Dup {
            base: args.word("base")?,
        },
        "struct" => Combinator::Struct {
            blocklengths: args.list("blocklengths")?,
            displacements: args.list("displacements")?,
            bases: args.names("bases")?,
        },
        other => {
            return Err(ScriptError::new(line, format!("unknown combinator `{other}`")));
        }
    };
    args.finish()?;

    Ok(Definition {
        line,
        name: name.to_string(),
        combinator,
    })
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Split into words and bracketed, comma-separated lists.
fn tokenize(line: usize, text: &str) -> Result<Vec<Token<'_>>, ScriptError> {
    let mut tokens = Vec::new();
    let mut rest = text.trim_start();

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('[') {
            let Some((inner, tail)) = after.split_once(']') else {
                return Err(ScriptError::new(line, "unterminated `[`"));
            };
            let items = if inner.trim().is_empty() {
                Vec::new()
            } else {
                inner.split(',').map(str::trim).collect()
            };
            tokens.push(Token::List(items));
            rest = tail.trim_start();
        } else {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '[')
                .unwrap_or(rest.len());
            tokens.push(Token::Word(&rest[..end]));
            rest = rest[end..].trim_start();
        }
    }

    Ok(tokens)
}

/// Cursor over a combinator's arguments.
struct Args<'t, 'a> {
    line: usize,
    args: &'t [Token<'a>],
    next: usize,
}

impl<'t, 'a> Args<'t, 'a> {
    fn take(&mut self, what: &str) -> Result<&'t Token<'a>, ScriptError> {
        let args = self.args;
        let token = args
            .get(self.next)
            .ok_or_else(|| ScriptError::new(self.line, format!("missing {what}")))?;
        self.next += 1;
        Ok(token)
    }

    fn word(&mut self, what: &str) -> Result<String, ScriptError> {
        match self.take(what)? {
            Token::Word(word) => Ok((*word).to_string()),
            Token::List(_) => Err(ScriptError::new(
                self.line,
                format!("expected {what}, found a list"),
            )),
        }
    }

    fn scalar<T: std::str::FromStr>(&mut self, what: &str) -> Result<T, ScriptError> {
        let line = self.line;
        let word = self.word(what)?;
        number(line, what, &word)
    }

    fn list<T: std::str::FromStr>(&mut self, what: &str) -> Result<Vec<T>, ScriptError> {
        let line = self.line;
        match self.take(what)? {
            Token::List(items) => items.iter().map(|item| number(line, what, item)).collect(),
            Token::Word(word) => Err(ScriptError::new(
                line,
                format!("expected {what} as `[..]`, found `{word}`"),
            )),
        }
    }

    fn names(&mut self, what: &str) -> Result<Vec<String>, ScriptError> {
        let line = self.line;
        match self.take(what)? {
            Token::List(items) => Ok(items.iter().map(|item| (*item).to_string()).collect()),
            Token::Word(word) => Err(ScriptError::new(
                line,
                format!("expected {what} as `[..]`, found `{word}`"),
            )),
        }
    }

    fn finish(&self) -> Result<(), ScriptError> {
        if self.next < self.args.len() {
            return Err(ScriptError::new(self.line, "too many arguments"));
        }
        Ok(())
    }
}

fn number<T: std::str::FromStr>(line: usize, what: &str, text: &str) -> Result<T, ScriptError> {
    text.parse()
        .map_err(|_| ScriptError::new(line, format!("invalid {what} `{text}`")))
}

// === Evaluation ===

/// Definitions built so far, by name.
#[derive(Debug)]
pub struct Session<'p> {
    pool: &'p TypePool,
    names: FxHashMap<String, TypeId>,
    order: Vec<(String, TypeId)>,
}

impl<'p> Session<'p> {
    pub fn new(pool: &'p TypePool) -> Self {
        Self {
            pool,
            names: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    /// Build one definition. Argument shapes and byte ranges are checked
    /// here so that no malformed call reaches the pool.
    #[tracing::instrument(level = "debug", skip_all, fields(line = definition.line, name = %definition.name))]
    pub fn define(&mut self, definition: &Definition) -> Result<TypeId, ScriptError> {
        let line = definition.line;
        if self.names.contains_key(&definition.name) {
            return Err(ScriptError::new(
                line,
                format!("`{}` is already defined", definition.name),
            ));
        }

        let layout_error = |err: LayoutError| ScriptError::new(line, err.to_string());
        let in_range = |checked: Option<()>| {
            checked.ok_or_else(|| {
                ScriptError::new(
                    line,
                    format!("`{}` overflows 64-bit byte arithmetic", definition.name),
                )
            })
        };
        let pool = self.pool;

        let id = match &definition.combinator {
            Combinator::Contiguous { count, base } => {
                let base = self.resolve(line, base)?;
                let old = pool.layout_of(base).map_err(layout_error)?;
                in_range(range::contiguous(&old, *count))?;
                pool.contiguous(base, *count)
            }
            Combinator::Vector {
                count,
                blocklength,
                stride,
                base,
            } => {
                let base = self.resolve(line, base)?;
                let old = pool.layout_of(base).map_err(layout_error)?;
                in_range(range::vector(&old, *count, *blocklength, *stride, Units::Elements))?;
                pool.vector(base, *count, *blocklength, *stride)
            }
            Combinator::Hvector {
                count,
                blocklength,
                stride,
                base,
            } => {
                let base = self.resolve(line, base)?;
                let old = pool.layout_of(base).map_err(layout_error)?;
                in_range(range::vector(&old, *count, *blocklength, *stride, Units::Bytes))?;
                pool.hvector(base, *count, *blocklength, *stride)
            }
            Combinator::Indexed {
                blocklengths,
                displacements,
                base,
            } => {
                check_index_lists(line, blocklengths, displacements)?;
                let base = self.resolve(line, base)?;
                let old = pool.layout_of(base).map_err(layout_error)?;
                in_range(range::indexed(&old, blocklengths, displacements, Units::Elements))?;
                pool.indexed(base, blocklengths, displacements)
            }
            Combinator::Hindexed {
                blocklengths,
                displacements,
                base,
            } => {
                check_index_lists(line, blocklengths, displacements)?;
                let base = self.resolve(line, base)?;
                let old = pool.layout_of(base).map_err(layout_error)?;
                in_range(range::indexed(&old, blocklengths, displacements, Units::Bytes))?;
                pool.hindexed(base, blocklengths, displacements)
            }
            Combinator::IndexedBlock {
                blocklength,
                displacements,
                base,
            } => {
                let base = self.resolve(line, base)?;
                let old = pool.layout_of(base).map_err(layout_error)?;
                in_range(range::block_indexed(
                    &old,
                    *blocklength,
                    displacements,
                    Units::Elements,
                ))?;
                pool.indexed_block(base, *blocklength, displacements)
            }
            Combinator::HindexedBlock {
                blocklength,
                displacements,
                base,
            } => {
                let base = self.resolve(line, base)?;
                let old = pool.layout_of(base).map_err(layout_error)?;
                in_range(range::block_indexed(&old, *blocklength, displacements, Units::Bytes))?;
                pool.hindexed_block(base, *blocklength, displacements)
            }
            Combinator::Resized { base, lb, extent } => {
                let base = self.resolve(line, base)?;
                let old = pool.layout_of(base).map_err(layout_error)?;
                in_range(range::resized(&old, *lb, *extent))?;
                pool.resized(base, *lb, *extent)
            }
            Combinator::Dup { base } => pool.dup(self.resolve(line, base)?),
            Combinator::Struct {
                blocklengths,
                displacements,
                bases,
            } => {
                if blocklengths.len() != displacements.len() || blocklengths.len() != bases.len() {
                    return Err(ScriptError::new(line, "struct field lists differ in length"));
                }
                let bases = bases
                    .iter()
                    .map(|base| self.resolve(line, base))
                    .collect::<Result<Vec<_>, _>>()?;
                let fields = blocklengths
                    .iter()
                    .zip(displacements)
                    .zip(&bases)
                    .map(|((&blocklength, &displacement), &base)| {
                        Ok(range::Field {
                            blocklength,
                            displacement,
                            base: pool.layout_of(base).map_err(layout_error)?,
                        })
                    })
                    .collect::<Result<Vec<_>, ScriptError>>()?;
                in_range(range::aggregate(&fields))?;
                pool.struct_type(blocklengths, displacements, &bases)
            }
        }
        .map_err(layout_error)?;

        self.names.insert(definition.name.clone(), id);
        self.order.push((definition.name.clone(), id));
        Ok(id)
    }

    /// Definitions in script order.
    pub fn definitions(&self) -> &[(String, TypeId)] {
        &self.order
    }

    fn resolve(&self, line: usize, name: &str) -> Result<TypeRef, ScriptError> {
        if let Some(&id) = self.names.get(name) {
            return Ok(TypeRef::Derived(id));
        }
        BasicType::from_name(name)
            .map(TypeRef::Basic)
            .ok_or_else(|| ScriptError::new(line, format!("unknown type `{name}`")))
    }
}

fn check_index_lists(
    line: usize,
    blocklengths: &[u32],
    displacements: &[i64],
) -> Result<(), ScriptError> {
    if blocklengths.len() != displacements.len() {
        return Err(ScriptError::new(
            line,
            "blocklength and displacement lists differ in length",
        ));
    }
    if !blocklengths.is_empty() && blocklengths.iter().all(|&blocklength| blocklength == 0) {
        return Err(ScriptError::new(line, "every blocklength is zero"));
    }
    Ok(())
}

/// Parse and build a whole script.
pub fn run<'p>(pool: &'p TypePool, source: &str) -> Result<Session<'p>, ScriptError> {
    let mut session = Session::new(pool);
    for definition in parse(source)? {
        session.define(&definition)?;
    }
    Ok(session)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
