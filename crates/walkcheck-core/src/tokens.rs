//! Token catalog: the closed set of node kinds and a bitset keyed by them.
//!
//! Every [`TokenKind`] has a dense integer id starting at 1 and a stable
//! upper-case name (`METHOD_DEF`, `LITERAL_SWITCH`, ...). The catalog is
//! fixed at compile time, so dispatch tables can be flat vectors indexed by
//! id and subscriptions can be stored as [`TokenSet`] bitsets.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error returned when a token name is not part of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown token kind `{0}`")]
pub struct UnknownTokenKind(pub String);

macro_rules! token_kinds {
    ($first:ident => $first_name:literal, $($variant:ident => $name:literal,)*) => {
        /// Kind of a syntax tree node.
        ///
        /// Discriminants are the dense ids used as dispatch keys.
        #[allow(missing_docs)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u16)]
        pub enum TokenKind {
            $first = 1,
            $($variant,)*
        }

        impl TokenKind {
            /// Every kind, ordered by id.
            pub const ALL: &'static [TokenKind] = &[TokenKind::$first, $(TokenKind::$variant,)*];

            /// Number of kinds in the catalog.
            pub const COUNT: usize = Self::ALL.len();

            /// Returns the catalog name of this kind (e.g. `"METHOD_DEF"`).
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    TokenKind::$first => $first_name,
                    $(TokenKind::$variant => $name,)*
                }
            }

            /// Looks a kind up by its catalog name.
            ///
            /// # Errors
            ///
            /// Returns [`UnknownTokenKind`] if no kind carries that name.
            pub fn from_name(name: &str) -> Result<Self, UnknownTokenKind> {
                match name {
                    $first_name => Ok(TokenKind::$first),
                    $($name => Ok(TokenKind::$variant),)*
                    other => Err(UnknownTokenKind(other.to_string())),
                }
            }
        }
    };
}

token_kinds! {
    CompilationUnit => "COMPILATION_UNIT",
    Eof => "EOF",
    Modifiers => "MODIFIERS",
    Objblock => "OBJBLOCK",
    Slist => "SLIST",
    CtorDef => "CTOR_DEF",
    MethodDef => "METHOD_DEF",
    VariableDef => "VARIABLE_DEF",
    InstanceInit => "INSTANCE_INIT",
    StaticInit => "STATIC_INIT",
    Type => "TYPE",
    ClassDef => "CLASS_DEF",
    InterfaceDef => "INTERFACE_DEF",
    PackageDef => "PACKAGE_DEF",
    ArrayDeclarator => "ARRAY_DECLARATOR",
    ExtendsClause => "EXTENDS_CLAUSE",
    ImplementsClause => "IMPLEMENTS_CLAUSE",
    Parameters => "PARAMETERS",
    ParameterDef => "PARAMETER_DEF",
    LabeledStat => "LABELED_STAT",
    Typecast => "TYPECAST",
    IndexOp => "INDEX_OP",
    PostInc => "POST_INC",
    PostDec => "POST_DEC",
    MethodCall => "METHOD_CALL",
    MethodRef => "METHOD_REF",
    Expr => "EXPR",
    ArrayInit => "ARRAY_INIT",
    Import => "IMPORT",
    UnaryMinus => "UNARY_MINUS",
    UnaryPlus => "UNARY_PLUS",
    CaseGroup => "CASE_GROUP",
    Elist => "ELIST",
    ForInit => "FOR_INIT",
    ForCondition => "FOR_CONDITION",
    ForIterator => "FOR_ITERATOR",
    EmptyStat => "EMPTY_STAT",
    Final => "FINAL",
    Abstract => "ABSTRACT",
    Strictfp => "STRICTFP",
    SuperCtorCall => "SUPER_CTOR_CALL",
    CtorCall => "CTOR_CALL",
    Semi => "SEMI",
    Rbrack => "RBRACK",
    LiteralVoid => "LITERAL_VOID",
    LiteralBoolean => "LITERAL_BOOLEAN",
    LiteralByte => "LITERAL_BYTE",
    LiteralChar => "LITERAL_CHAR",
    LiteralShort => "LITERAL_SHORT",
    LiteralInt => "LITERAL_INT",
    LiteralFloat => "LITERAL_FLOAT",
    LiteralLong => "LITERAL_LONG",
    LiteralDouble => "LITERAL_DOUBLE",
    Ident => "IDENT",
    Dot => "DOT",
    Star => "STAR",
    LiteralPrivate => "LITERAL_PRIVATE",
    LiteralPublic => "LITERAL_PUBLIC",
    LiteralProtected => "LITERAL_PROTECTED",
    LiteralStatic => "LITERAL_STATIC",
    LiteralTransient => "LITERAL_TRANSIENT",
    LiteralNative => "LITERAL_NATIVE",
    LiteralSynchronized => "LITERAL_SYNCHRONIZED",
    LiteralVolatile => "LITERAL_VOLATILE",
    LiteralClass => "LITERAL_CLASS",
    LiteralInterface => "LITERAL_INTERFACE",
    Lcurly => "LCURLY",
    Rcurly => "RCURLY",
    Comma => "COMMA",
    Lparen => "LPAREN",
    Rparen => "RPAREN",
    LiteralThis => "LITERAL_THIS",
    LiteralSuper => "LITERAL_SUPER",
    Assign => "ASSIGN",
    LiteralThrows => "LITERAL_THROWS",
    Colon => "COLON",
    DoubleColon => "DOUBLE_COLON",
    LiteralIf => "LITERAL_IF",
    LiteralFor => "LITERAL_FOR",
    LiteralWhile => "LITERAL_WHILE",
    LiteralDo => "LITERAL_DO",
    DoWhile => "DO_WHILE",
    LiteralBreak => "LITERAL_BREAK",
    LiteralContinue => "LITERAL_CONTINUE",
    LiteralReturn => "LITERAL_RETURN",
    LiteralSwitch => "LITERAL_SWITCH",
    LiteralThrow => "LITERAL_THROW",
    LiteralElse => "LITERAL_ELSE",
    LiteralCase => "LITERAL_CASE",
    LiteralDefault => "LITERAL_DEFAULT",
    LiteralTry => "LITERAL_TRY",
    ResourceSpecification => "RESOURCE_SPECIFICATION",
    Resources => "RESOURCES",
    Resource => "RESOURCE",
    LiteralCatch => "LITERAL_CATCH",
    LiteralFinally => "LITERAL_FINALLY",
    PlusAssign => "PLUS_ASSIGN",
    MinusAssign => "MINUS_ASSIGN",
    StarAssign => "STAR_ASSIGN",
    DivAssign => "DIV_ASSIGN",
    ModAssign => "MOD_ASSIGN",
    SrAssign => "SR_ASSIGN",
    BsrAssign => "BSR_ASSIGN",
    SlAssign => "SL_ASSIGN",
    BandAssign => "BAND_ASSIGN",
    BxorAssign => "BXOR_ASSIGN",
    BorAssign => "BOR_ASSIGN",
    Question => "QUESTION",
    Lor => "LOR",
    Land => "LAND",
    Bor => "BOR",
    Bxor => "BXOR",
    Band => "BAND",
    NotEqual => "NOT_EQUAL",
    Equal => "EQUAL",
    Lt => "LT",
    Gt => "GT",
    Le => "LE",
    Ge => "GE",
    LiteralInstanceof => "LITERAL_INSTANCEOF",
    Sl => "SL",
    Sr => "SR",
    Bsr => "BSR",
    Plus => "PLUS",
    Minus => "MINUS",
    Div => "DIV",
    Mod => "MOD",
    Inc => "INC",
    Dec => "DEC",
    Bnot => "BNOT",
    Lnot => "LNOT",
    LiteralTrue => "LITERAL_TRUE",
    LiteralFalse => "LITERAL_FALSE",
    LiteralNull => "LITERAL_NULL",
    LiteralNew => "LITERAL_NEW",
    NumInt => "NUM_INT",
    CharLiteral => "CHAR_LITERAL",
    StringLiteral => "STRING_LITERAL",
    NumFloat => "NUM_FLOAT",
    NumLong => "NUM_LONG",
    NumDouble => "NUM_DOUBLE",
    LiteralAssert => "LITERAL_ASSERT",
    StaticImport => "STATIC_IMPORT",
    EnumDef => "ENUM_DEF",
    Enum => "ENUM",
    EnumConstantDef => "ENUM_CONSTANT_DEF",
    ForEachClause => "FOR_EACH_CLAUSE",
    AnnotationDef => "ANNOTATION_DEF",
    AnnotationFieldDef => "ANNOTATION_FIELD_DEF",
    Annotations => "ANNOTATIONS",
    Annotation => "ANNOTATION",
    AnnotationMemberValuePair => "ANNOTATION_MEMBER_VALUE_PAIR",
    AnnotationArrayInit => "ANNOTATION_ARRAY_INIT",
    TypeParameters => "TYPE_PARAMETERS",
    TypeParameter => "TYPE_PARAMETER",
    TypeArguments => "TYPE_ARGUMENTS",
    TypeArgument => "TYPE_ARGUMENT",
    WildcardType => "WILDCARD_TYPE",
    TypeUpperBounds => "TYPE_UPPER_BOUNDS",
    TypeLowerBounds => "TYPE_LOWER_BOUNDS",
    At => "AT",
    Ellipsis => "ELLIPSIS",
    TypeExtensionAnd => "TYPE_EXTENSION_AND",
    GenericStart => "GENERIC_START",
    GenericEnd => "GENERIC_END",
    Lambda => "LAMBDA",
    SingleLineComment => "SINGLE_LINE_COMMENT",
    BlockCommentBegin => "BLOCK_COMMENT_BEGIN",
    BlockCommentEnd => "BLOCK_COMMENT_END",
    CommentContent => "COMMENT_CONTENT",
    RecordDef => "RECORD_DEF",
    RecordComponents => "RECORD_COMPONENTS",
    RecordComponentDef => "RECORD_COMPONENT_DEF",
    CompactCtorDef => "COMPACT_CTOR_DEF",
    LiteralRecord => "LITERAL_RECORD",
    SwitchRule => "SWITCH_RULE",
    LiteralYield => "LITERAL_YIELD",
    PatternVariableDef => "PATTERN_VARIABLE_DEF",
    TextBlockLiteralBegin => "TEXT_BLOCK_LITERAL_BEGIN",
    TextBlockContent => "TEXT_BLOCK_CONTENT",
    TextBlockLiteralEnd => "TEXT_BLOCK_LITERAL_END",
}

impl TokenKind {
    /// Returns the dense id of this kind.
    #[must_use]
    pub const fn id(self) -> u16 {
        self as u16
    }

    /// Looks a kind up by id.
    #[must_use]
    pub fn from_id(id: u16) -> Option<Self> {
        usize::from(id)
            .checked_sub(1)
            .and_then(|index| Self::ALL.get(index))
            .copied()
    }

    /// Class, interface, enum, annotation and record definitions.
    #[must_use]
    pub fn is_type_declaration(self) -> bool {
        matches!(
            self,
            Self::ClassDef
                | Self::InterfaceDef
                | Self::AnnotationDef
                | Self::EnumDef
                | Self::RecordDef
        )
    }

    /// Comment nodes and their content.
    #[must_use]
    pub fn is_comment(self) -> bool {
        matches!(
            self,
            Self::SingleLineComment
                | Self::BlockCommentBegin
                | Self::BlockCommentEnd
                | Self::CommentContent
        )
    }

    /// Numeric literal kinds.
    #[must_use]
    pub fn is_number_literal(self) -> bool {
        matches!(
            self,
            Self::NumInt | Self::NumLong | Self::NumFloat | Self::NumDouble
        )
    }

    /// Modifier keywords that may appear under `MODIFIERS`.
    #[must_use]
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Self::LiteralPublic
                | Self::LiteralProtected
                | Self::LiteralPrivate
                | Self::LiteralStatic
                | Self::LiteralTransient
                | Self::LiteralNative
                | Self::LiteralSynchronized
                | Self::LiteralVolatile
                | Self::LiteralDefault
                | Self::Final
                | Self::Abstract
                | Self::Strictfp
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TokenKind {
    type Err = UnknownTokenKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

const WORDS: usize = TokenKind::COUNT / 64 + 1;

/// A set of token kinds stored as a bitset indexed by id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TokenSet {
    bits: [u64; WORDS],
}

impl TokenSet {
    /// The empty set.
    pub const EMPTY: Self = Self { bits: [0; WORDS] };

    /// Creates a set from a slice of kinds.
    #[must_use]
    pub fn of(kinds: &[TokenKind]) -> Self {
        kinds.iter().copied().collect()
    }

    /// Every kind in the catalog.
    #[must_use]
    pub fn all() -> Self {
        TokenKind::ALL.iter().copied().collect()
    }

    /// Parses a list of token names.
    ///
    /// # Errors
    ///
    /// Returns the first name that is not in the catalog.
    pub fn parse_names<S: AsRef<str>>(names: &[S]) -> Result<Self, UnknownTokenKind> {
        names
            .iter()
            .map(|name| TokenKind::from_name(name.as_ref().trim()))
            .collect()
    }

    /// Adds a kind to the set.
    pub fn insert(&mut self, kind: TokenKind) {
        let id = usize::from(kind.id());
        self.bits[id / 64] |= 1 << (id % 64);
    }

    /// Returns true if the set contains `kind`.
    #[must_use]
    pub fn contains(&self, kind: TokenKind) -> bool {
        let id = usize::from(kind.id());
        self.bits[id / 64] & (1 << (id % 64)) != 0
    }

    /// Returns the union of two sets.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut bits = self.bits;
        for (word, theirs) in bits.iter_mut().zip(other.bits) {
            *word |= theirs;
        }
        Self { bits }
    }

    /// Returns the kinds in `self` that are not in `other`.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        let mut bits = self.bits;
        for (word, theirs) in bits.iter_mut().zip(other.bits) {
            *word &= !theirs;
        }
        Self { bits }
    }

    /// Returns true if every kind in `self` is also in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.difference(other).is_empty()
    }

    /// Returns true if the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|w| *w == 0)
    }

    /// Number of kinds in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterates the members in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = TokenKind> + '_ {
        TokenKind::ALL.iter().copied().filter(|k| self.contains(*k))
    }
}

impl FromIterator<TokenKind> for TokenSet {
    fn from_iter<I: IntoIterator<Item = TokenKind>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(TokenKind::name).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}
