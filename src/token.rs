//! The token type registry.
//!
//! Every lexeme class the tokenizer can produce is a `TokenKind` variant.
//! Each carries immutable descriptor data — label, optional keyword text,
//! `before_expr`/`starts_expr`/`is_loop`/`is_assign`/prefix/postfix flags,
//! binary precedence, and right-associativity — looked up through
//! [`TokenKind::info`], a pure `match`. The original mutates a per-type
//! registry object at module load to attach `updateContext` hooks; this
//! reimplementation keeps the descriptor table and the context-update
//! behavior (see `context.rs`) as static functions instead, per the
//! "prefer static dispatch" guidance — there is no load-time registry
//! mutation to reason about, and the table is trivially `Copy`.

use rowan::TextRange;

/// All lexeme classes: punctuators, keywords, literals, and structural
/// sentinels (EOF, error-recovery `Garbage`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TokenKind {
    Eof,
    /// Coalesced run of unrecognized characters (lexical error recovery).
    Garbage,

    Name,
    PrivateName,
    Num,
    BigInt,
    Str,
    Regex,
    /// A template chunk (`raw`/`cooked` between `` ` ``/`${`/`}`).
    Template,

    // Punctuators
    BraceL,
    BraceR,
    ParenL,
    ParenR,
    BracketL,
    BracketR,
    Comma,
    Semi,
    Colon,
    DoubleColon,
    Dot,
    Ellipsis,
    Question,
    QuestionDot,
    Arrow,
    TemplateDollarBraceL,
    Backtick,
    At,
    Hash,

    // Operators
    Eq,
    Assign,
    IncDec,
    Bang,
    Tilde,
    Arith,  // + -
    Modulo,
    Star,
    Slash,
    StarStar,
    LogicalOr,
    LogicalAnd,
    BitwiseOr,
    BitwiseAnd,
    BitwiseXor,
    Relational,    // < > <= >=
    Equality,      // == != === !==
    BitShift,      // << >> >>>
    Nullish,       // ??
    DoubleArrow,   // => (alias kept for spec name parity; same as Arrow)

    // Keywords
    KwBreak,
    KwCase,
    KwCatch,
    KwContinue,
    KwDebugger,
    KwDefault,
    KwDo,
    KwElse,
    KwFinally,
    KwFor,
    KwFunction,
    KwIf,
    KwReturn,
    KwSwitch,
    KwThrow,
    KwTry,
    KwVar,
    KwConst,
    KwWhile,
    KwWith,
    KwNew,
    KwThis,
    KwSuper,
    KwClass,
    KwExtends,
    KwExport,
    KwImport,
    KwNull,
    KwTrue,
    KwFalse,
    KwIn,
    KwInstanceof,
    KwTypeof,
    KwVoid,
    KwDelete,
    KwYield,
    KwAwait,

    // Trivia
    Whitespace,
    LineComment,
    BlockComment,
}

/// Immutable per-kind descriptor, mirroring the original's `TokenType`.
#[derive(Debug, Clone, Copy)]
pub struct TokenInfo {
    pub label: &'static str,
    pub keyword: Option<&'static str>,
    pub before_expr: bool,
    pub starts_expr: bool,
    pub is_loop: bool,
    pub is_assign: bool,
    pub prefix: bool,
    pub postfix: bool,
    pub right_associative: bool,
    /// Binary operator precedence, 1 (loosest) through 11 (`**`).
    pub binop: Option<u8>,
}

const fn info(label: &'static str) -> TokenInfo {
    TokenInfo {
        label,
        keyword: None,
        before_expr: false,
        starts_expr: false,
        is_loop: false,
        is_assign: false,
        prefix: false,
        postfix: false,
        right_associative: false,
        binop: None,
    }
}

impl TokenInfo {
    const fn before_expr(mut self) -> Self {
        self.before_expr = true;
        self
    }
    const fn starts_expr(mut self) -> Self {
        self.starts_expr = true;
        self
    }
    const fn is_loop(mut self) -> Self {
        self.is_loop = true;
        self
    }
    const fn is_assign(mut self) -> Self {
        self.is_assign = true;
        self
    }
    const fn prefix(mut self) -> Self {
        self.prefix = true;
        self
    }
    const fn postfix(mut self) -> Self {
        self.postfix = true;
        self
    }
    const fn right_associative(mut self) -> Self {
        self.right_associative = true;
        self
    }
    const fn binop(mut self, prec: u8) -> Self {
        self.binop = Some(prec);
        self
    }
    const fn keyword(mut self, kw: &'static str) -> Self {
        self.keyword = Some(kw);
        self
    }
}

impl TokenKind {
    /// Look up this kind's immutable descriptor.
    pub const fn info(self) -> TokenInfo {
        use TokenKind::*;
        match self {
            Eof => info("eof"),
            Garbage => info("garbage"),

            Name => info("name").starts_expr(),
            PrivateName => info("privateName").starts_expr(),
            Num => info("num").starts_expr(),
            BigInt => info("bigint").starts_expr(),
            Str => info("string").starts_expr(),
            Regex => info("regexp").starts_expr(),
            Template => info("template").starts_expr(),

            BraceL => info("{").before_expr().starts_expr(),
            BraceR => info("}"),
            ParenL => info("(").before_expr().starts_expr(),
            ParenR => info(")"),
            BracketL => info("[").before_expr().starts_expr(),
            BracketR => info("]"),
            Comma => info(",").before_expr(),
            Semi => info(";").before_expr(),
            Colon => info(":").before_expr(),
            DoubleColon => info("::").before_expr(),
            Dot => info("."),
            Ellipsis => info("...").before_expr(),
            Question => info("?").before_expr(),
            QuestionDot => info("?."),
            Arrow => info("=>").before_expr(),
            DoubleArrow => info("=>").before_expr(),
            TemplateDollarBraceL => info("${").before_expr().starts_expr(),
            Backtick => info("`").starts_expr(),
            At => info("@"),
            Hash => info("#"),

            Eq => info("=").before_expr().is_assign(),
            Assign => info("_=").before_expr().is_assign(),
            IncDec => info("++/--").prefix().postfix().starts_expr(),
            Bang => info("!").before_expr().prefix().starts_expr(),
            Tilde => info("~").before_expr().prefix().starts_expr(),
            Arith => info("+/-").before_expr().prefix().starts_expr().binop(9),
            Modulo => info("%").before_expr().binop(10),
            Star => info("*").before_expr().binop(10),
            Slash => info("/").before_expr().binop(10),
            StarStar => info("**").before_expr().right_associative().binop(11),
            LogicalOr => info("||").before_expr().binop(1),
            LogicalAnd => info("&&").before_expr().binop(2),
            BitwiseOr => info("|").before_expr().binop(3),
            BitwiseAnd => info("&").before_expr().binop(5),
            BitwiseXor => info("^").before_expr().binop(4),
            Relational => info("</>/<=/>=").before_expr().binop(7),
            Equality => info("==/!=").before_expr().binop(6),
            BitShift => info("<</>>/>>>").before_expr().binop(8),
            Nullish => info("??").before_expr().binop(1),

            KwBreak => info("break").keyword("break"),
            KwCase => info("case").keyword("case").before_expr(),
            KwCatch => info("catch").keyword("catch"),
            KwContinue => info("continue").keyword("continue"),
            KwDebugger => info("debugger").keyword("debugger"),
            KwDefault => info("default").keyword("default").before_expr(),
            KwDo => info("do").keyword("do").is_loop().before_expr(),
            KwElse => info("else").keyword("else").before_expr(),
            KwFinally => info("finally").keyword("finally"),
            KwFor => info("for").keyword("for").is_loop(),
            KwFunction => info("function").keyword("function").starts_expr(),
            KwIf => info("if").keyword("if"),
            KwReturn => info("return").keyword("return").before_expr(),
            KwSwitch => info("switch").keyword("switch"),
            KwThrow => info("throw").keyword("throw").before_expr(),
            KwTry => info("try").keyword("try"),
            KwVar => info("var").keyword("var"),
            KwConst => info("const").keyword("const"),
            KwWhile => info("while").keyword("while").is_loop(),
            KwWith => info("with").keyword("with"),
            KwNew => info("new").keyword("new").before_expr().starts_expr(),
            KwThis => info("this").keyword("this").starts_expr(),
            KwSuper => info("super").keyword("super").starts_expr(),
            KwClass => info("class").keyword("class").starts_expr(),
            KwExtends => info("extends").keyword("extends").before_expr(),
            KwExport => info("export").keyword("export"),
            KwImport => info("import").keyword("import").starts_expr(),
            KwNull => info("null").keyword("null").starts_expr(),
            KwTrue => info("true").keyword("true").starts_expr(),
            KwFalse => info("false").keyword("false").starts_expr(),
            KwIn => info("in").keyword("in").before_expr().binop(7),
            KwInstanceof => info("instanceof").keyword("instanceof").before_expr().binop(7),
            KwTypeof => info("typeof").keyword("typeof").before_expr().prefix().starts_expr(),
            KwVoid => info("void").keyword("void").before_expr().prefix().starts_expr(),
            KwDelete => info("delete").keyword("delete").before_expr().prefix().starts_expr(),
            KwYield => info("yield").keyword("yield").before_expr().starts_expr(),
            KwAwait => info("await").keyword("await").before_expr().prefix().starts_expr(),

            Whitespace => info("whitespace"),
            LineComment => info("//"),
            BlockComment => info("/* */"),
        }
    }

    pub const fn is_keyword(self) -> bool {
        self.info().keyword.is_some()
    }
}

/// Reserved-word lookup, split by the spec's three buckets: always
/// reserved, strict-mode reserved, and strict-binding reserved (a name
/// that is only illegal as a *binding* in strict mode, e.g. `yield`).
pub fn keyword_kind(word: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match word {
        "break" => KwBreak,
        "case" => KwCase,
        "catch" => KwCatch,
        "continue" => KwContinue,
        "debugger" => KwDebugger,
        "default" => KwDefault,
        "do" => KwDo,
        "else" => KwElse,
        "finally" => KwFinally,
        "for" => KwFor,
        "function" => KwFunction,
        "if" => KwIf,
        "return" => KwReturn,
        "switch" => KwSwitch,
        "throw" => KwThrow,
        "try" => KwTry,
        "var" => KwVar,
        "const" => KwConst,
        "while" => KwWhile,
        "with" => KwWith,
        "new" => KwNew,
        "this" => KwThis,
        "super" => KwSuper,
        "class" => KwClass,
        "extends" => KwExtends,
        "export" => KwExport,
        "import" => KwImport,
        "null" => KwNull,
        "true" => KwTrue,
        "false" => KwFalse,
        "in" => KwIn,
        "instanceof" => KwInstanceof,
        "typeof" => KwTypeof,
        "void" => KwVoid,
        "delete" => KwDelete,
        "yield" => KwYield,
        "await" => KwAwait,
        _ => return None,
    })
}

/// Contextual keywords: only keywords in specific grammatical positions,
/// `Name` tokens everywhere else (unlike `keyword_kind`'s always-reserved
/// set, these never change what the tokenizer emits).
pub fn is_contextual_keyword(word: &str) -> bool {
    matches!(
        word,
        "let"
            | "async"
            | "static"
            | "get"
            | "set"
            | "of"
            | "as"
            | "from"
            | "implements"
            | "interface"
            | "package"
            | "private"
            | "protected"
            | "public"
            | "enum"
    )
}

pub const ALWAYS_RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "export", "extends", "false", "finally", "for", "function", "if", "import", "in",
    "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with",
];

pub const STRICT_RESERVED: &[&str] = &[
    "implements", "interface", "let", "package", "private", "protected", "public", "static",
    "yield",
];

/// Only illegal as a *binding* name in strict mode.
pub const STRICT_BIND_RESERVED: &[&str] = &["eval", "arguments"];

pub fn is_reserved_word(word: &str, in_strict: bool) -> bool {
    ALWAYS_RESERVED.contains(&word) || (in_strict && STRICT_RESERVED.contains(&word))
}

pub fn is_strict_binding_reserved(word: &str, in_strict: bool) -> bool {
    is_reserved_word(word, in_strict) || (in_strict && STRICT_BIND_RESERVED.contains(&word))
}

/// Literal payload carried by value-bearing tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    None,
    Num(f64),
    BigInt(String),
    Str(String),
    Regex { pattern: String, flags: String },
    /// Template chunk: `cooked` is `None` when an invalid escape makes the
    /// chunk only usable in a tagged-template position. `tail` is true for
    /// the closing-backtick chunk, false for a chunk followed by `${`.
    Template {
        cooked: Option<String>,
        raw: String,
        tail: bool,
    },
}

/// A lexed token: kind, span, and (for literals) value.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: TextRange,
    pub value: TokenValue,
    /// Set when an identifier/keyword token's text contained a `\u` escape
    /// — such a token can never be treated as a reserved word (spec §4.1).
    pub contains_esc: bool,
    /// True when a line terminator appeared between the previous token and
    /// this one (drives ASI).
    pub preceded_by_newline: bool,
}

impl Token {
    pub fn start(&self) -> u32 {
        self.span.start().into()
    }
    pub fn end(&self) -> u32 {
        self.span.end().into()
    }
}
