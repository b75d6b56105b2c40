//! Prompt layout compiler.
//!
//! Turns a format string such as `"u@h [i:p] d (g)"` plus an exclusion set
//! into an ordered list of [`RenderToken`]s. Only the eight element codes
//! (`u h i p d c v g`) carry meaning; every other character is ignored.
//! The compiler is total: any pair of strings compiles, possibly to an empty
//! layout.

use std::fmt;

/// The full layout used when no format is given.
pub const DEFAULT_FORMAT: &str = "uhipdcvg";

/// A single prompt element, addressed by its one-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Element {
    User,
    Host,
    Interface,
    Ip,
    Directory,
    Conda,
    Virtualenv,
    GitBranch,
}

impl Element {
    pub const ALL: [Element; 8] = [
        Element::User,
        Element::Host,
        Element::Interface,
        Element::Ip,
        Element::Directory,
        Element::Conda,
        Element::Virtualenv,
        Element::GitBranch,
    ];

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'u' => Some(Element::User),
            'h' => Some(Element::Host),
            'i' => Some(Element::Interface),
            'p' => Some(Element::Ip),
            'd' => Some(Element::Directory),
            'c' => Some(Element::Conda),
            'v' => Some(Element::Virtualenv),
            'g' => Some(Element::GitBranch),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Element::User => 'u',
            Element::Host => 'h',
            Element::Interface => 'i',
            Element::Ip => 'p',
            Element::Directory => 'd',
            Element::Conda => 'c',
            Element::Virtualenv => 'v',
            Element::GitBranch => 'g',
        }
    }

    /// Human-readable name, used in install summaries.
    pub fn label(self) -> &'static str {
        match self {
            Element::User => "username",
            Element::Host => "hostname",
            Element::Interface => "network interface",
            Element::Ip => "IP address",
            Element::Directory => "working directory",
            Element::Conda => "conda environment",
            Element::Virtualenv => "virtualenv",
            Element::GitBranch => "git branch",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Environment and branch indicators bracket themselves, so they sit
    /// next to each other without a separator.
    fn is_self_bracketed(self) -> bool {
        matches!(
            self,
            Element::Conda | Element::Virtualenv | Element::GitBranch
        )
    }
}

/// Per-element enabled state derived from a format string and exclusion set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureFlags {
    enabled: [bool; Element::ALL.len()],
}

impl FeatureFlags {
    /// An element is enabled when it occurs in `format` and not in `exclude`.
    pub fn derive(format: &str, exclude: &str) -> Self {
        let mut flags = FeatureFlags::default();
        for element in format.chars().filter_map(Element::from_code) {
            flags.enabled[element.index()] = true;
        }
        for element in exclude.chars().filter_map(Element::from_code) {
            flags.enabled[element.index()] = false;
        }
        flags
    }

    pub fn is_enabled(&self, element: Element) -> bool {
        self.enabled[element.index()]
    }

    /// Enabled elements in canonical alphabet order.
    pub fn enabled(&self) -> impl Iterator<Item = Element> + '_ {
        Element::ALL
            .into_iter()
            .filter(|element| self.is_enabled(*element))
    }
}

/// What a token renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    User,
    Host,
    /// `u` directly followed by `h`, joined with `@`.
    UserHost,
    /// The interface/IP group. Sub-parts follow the derived flags, so a lone
    /// `p` still yields this kind with only `ip` set.
    Network { interface: bool, ip: bool },
    Directory,
    Conda,
    Virtualenv,
    GitBranch,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::User => "user",
            TokenKind::Host => "host",
            TokenKind::UserHost => "user_host",
            TokenKind::Network { .. } => "interface_ip_group",
            TokenKind::Directory => "directory",
            TokenKind::Conda => "conda",
            TokenKind::Virtualenv => "virtualenv",
            TokenKind::GitBranch => "git_branch",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One renderable unit of the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderToken {
    pub kind: TokenKind,
    /// Whether a separator space precedes this token. Always false for the
    /// first token.
    pub leading_space: bool,
}

/// Result of compiling a format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    flags: FeatureFlags,
    filtered: String,
    tokens: Vec<RenderToken>,
}

impl Layout {
    pub fn flags(&self) -> &FeatureFlags {
        &self.flags
    }

    /// The enabled element codes in their original order, repeats included.
    pub fn filtered(&self) -> &str {
        &self.filtered
    }

    pub fn tokens(&self) -> &[RenderToken] {
        &self.tokens
    }

    /// True when nothing will render. Callers should warn about this.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Compile `format` with every element in `exclude` forced off.
pub fn compile(format: &str, exclude: &str) -> Layout {
    let flags = FeatureFlags::derive(format, exclude);
    let elements: Vec<Element> = format
        .chars()
        .filter_map(Element::from_code)
        .filter(|element| flags.is_enabled(*element))
        .collect();

    let filtered = elements.iter().map(|element| element.code()).collect();
    let tokens = emit_tokens(&elements, &flags);

    log::debug!(
        "compiled format {:?} (exclude {:?}) into {} token(s)",
        format,
        exclude,
        tokens.len()
    );
    log::trace!(
        "tokens: {}",
        tokens
            .iter()
            .map(|t| t.kind.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Layout {
        flags,
        filtered,
        tokens,
    }
}

fn emit_tokens(elements: &[Element], flags: &FeatureFlags) -> Vec<RenderToken> {
    let mut tokens = Vec::with_capacity(elements.len());
    let mut previous: Option<Element> = None;
    let mut rest = elements;

    while let Some((&current, tail)) = rest.split_first() {
        let (kind, consumed) = group(current, tail.first().copied(), flags);
        let leading_space = previous.is_some_and(|prev| needs_separator(prev, current));

        tokens.push(RenderToken {
            kind,
            leading_space,
        });

        previous = Some(rest[consumed - 1]);
        rest = &rest[consumed..];
    }

    tokens
}

/// Match the current element against its successor. Returns the token and
/// how many elements it consumed.
fn group(current: Element, next: Option<Element>, flags: &FeatureFlags) -> (TokenKind, usize) {
    let network = TokenKind::Network {
        interface: flags.is_enabled(Element::Interface),
        ip: flags.is_enabled(Element::Ip),
    };

    match (current, next) {
        (Element::User, Some(Element::Host)) => (TokenKind::UserHost, 2),
        (Element::Interface, Some(Element::Ip)) | (Element::Ip, Some(Element::Interface)) => {
            (network, 2)
        }
        (Element::Interface | Element::Ip, _) => (network, 1),
        (Element::User, _) => (TokenKind::User, 1),
        (Element::Host, _) => (TokenKind::Host, 1),
        (Element::Directory, _) => (TokenKind::Directory, 1),
        (Element::Conda, _) => (TokenKind::Conda, 1),
        (Element::Virtualenv, _) => (TokenKind::Virtualenv, 1),
        (Element::GitBranch, _) => (TokenKind::GitBranch, 1),
    }
}

fn needs_separator(previous: Element, current: Element) -> bool {
    let joined = matches!(
        (previous, current),
        (Element::User, Element::Host)
            | (Element::Interface, Element::Ip)
            | (Element::Ip, Element::Interface)
    );
    let bracketed = previous.is_self_bracketed() && current.is_self_bracketed();
    !(joined || bracketed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(layout: &Layout) -> Vec<TokenKind> {
        layout.tokens().iter().map(|t| t.kind).collect()
    }

    fn spaces(layout: &Layout) -> Vec<bool> {
        layout.tokens().iter().map(|t| t.leading_space).collect()
    }

    const BOTH: TokenKind = TokenKind::Network {
        interface: true,
        ip: true,
    };

    #[test]
    fn full_layout_with_punctuation() {
        let layout = compile("u@h [i:p] d (c) (v) (g)", "");

        assert_eq!(layout.filtered(), "uhipdcvg");
        assert_eq!(
            kinds(&layout),
            vec![
                TokenKind::UserHost,
                BOTH,
                TokenKind::Directory,
                TokenKind::Conda,
                TokenKind::Virtualenv,
                TokenKind::GitBranch,
            ]
        );
        assert_eq!(spaces(&layout), vec![false, true, true, true, false, false]);
    }

    #[test]
    fn excluded_interface_leaves_lone_ip_group() {
        let layout = compile("u@h [i:p] d", "i");

        assert_eq!(layout.filtered(), "uhpd");
        assert_eq!(
            kinds(&layout),
            vec![
                TokenKind::UserHost,
                TokenKind::Network {
                    interface: false,
                    ip: true
                },
                TokenKind::Directory,
            ]
        );
    }

    #[test]
    fn repeated_user_host_groups_are_independent() {
        let layout = compile("u@h u@h", "");

        assert_eq!(layout.filtered(), "uhuh");
        assert_eq!(kinds(&layout), vec![TokenKind::UserHost, TokenKind::UserHost]);
        assert_eq!(spaces(&layout), vec![false, true]);
    }

    #[test]
    fn empty_format_is_empty_layout() {
        let layout = compile("", "");

        assert!(layout.is_empty());
        assert_eq!(layout.filtered(), "");
        assert_eq!(layout.flags().enabled().next(), None);
    }

    #[test]
    fn everything_excluded_is_empty_layout() {
        let layout = compile(DEFAULT_FORMAT, "uhipdcvg");
        assert!(layout.is_empty());
    }

    // Quirk: c/v/g never get a forced separator between each other, so a
    // repeated git branch renders back to back.
    #[test]
    fn quirk_repeated_git_branch_has_no_separator() {
        let layout = compile("gg", "");

        assert_eq!(kinds(&layout), vec![TokenKind::GitBranch, TokenKind::GitBranch]);
        assert_eq!(spaces(&layout), vec![false, false]);
    }

    #[test]
    fn lone_ip_is_still_a_network_group() {
        let layout = compile("p", "");
        assert_eq!(
            kinds(&layout),
            vec![TokenKind::Network {
                interface: false,
                ip: true
            }]
        );
        assert_eq!(layout.tokens()[0].kind.as_str(), "interface_ip_group");
    }

    #[test]
    fn ip_before_interface_merges() {
        let layout = compile("pi", "");
        assert_eq!(kinds(&layout), vec![BOTH]);
    }

    #[test]
    fn network_sub_parts_follow_flags_not_adjacency() {
        let layout = compile("i d p", "");
        assert_eq!(kinds(&layout), vec![BOTH, TokenKind::Directory, BOTH]);
        assert_eq!(spaces(&layout), vec![false, true, true]);
    }

    #[test]
    fn user_without_host_has_no_join() {
        let layout = compile("u d", "h");
        assert_eq!(kinds(&layout), vec![TokenKind::User, TokenKind::Directory]);
    }

    #[test]
    fn host_before_user_does_not_join() {
        let layout = compile("hu", "");
        assert_eq!(kinds(&layout), vec![TokenKind::Host, TokenKind::User]);
        assert_eq!(spaces(&layout), vec![false, true]);
    }

    #[test]
    fn separator_is_decided_by_last_consumed_code() {
        // After the i/p pair the previous code is `p`, and p -> i is joined.
        let layout = compile("ipi", "");
        assert_eq!(kinds(&layout), vec![BOTH, BOTH]);
        assert_eq!(spaces(&layout), vec![false, false]);

        let layout = compile("uhg", "");
        assert_eq!(spaces(&layout), vec![false, true]);
    }

    #[test]
    fn unknown_characters_are_ignored_everywhere() {
        let layout = compile("xyz d 123", "qq!");
        assert_eq!(layout.filtered(), "d");
        assert_eq!(kinds(&layout), vec![TokenKind::Directory]);
    }

    #[test]
    fn flags_are_presence_minus_exclusion() {
        let inputs = [
            ("uhipdcvg", ""),
            ("u@h d", "d"),
            ("gdg", "ggg"),
            ("", "u"),
            ("ipip", "xp"),
            ("cvg", "vvv"),
        ];

        for (format, exclude) in inputs {
            let flags = FeatureFlags::derive(format, exclude);
            for element in Element::ALL {
                let code = element.code();
                let expected = format.contains(code) && !exclude.contains(code);
                assert_eq!(flags.is_enabled(element), expected, "{format:?} / {exclude:?} / {code}");
            }
        }
    }

    #[test]
    fn enabled_lists_canonical_order() {
        let flags = FeatureFlags::derive("g d u", "");
        let enabled: Vec<Element> = flags.enabled().collect();
        assert_eq!(enabled, vec![Element::User, Element::Directory, Element::GitBranch]);
    }

    #[test]
    fn adding_exclusions_never_enables() {
        let base = FeatureFlags::derive(DEFAULT_FORMAT, "d");
        let more = FeatureFlags::derive(DEFAULT_FORMAT, "dgx");
        for element in Element::ALL {
            assert!(!more.is_enabled(element) || base.is_enabled(element));
        }
    }

    #[test]
    fn filtered_is_ordered_subsequence_with_repeats() {
        let layout = compile("g d u g h d", "u");
        assert_eq!(layout.filtered(), "gdghd");
    }

    #[test]
    fn token_count_drops_one_per_consumed_pair() {
        let cases = [
            ("uhipdcvg", 6),
            ("uhuh", 2),
            ("ipip", 2),
            ("ipi", 2),
            ("piu", 2),
            ("hu", 2),
            ("dd", 2),
            ("uuh", 2),
        ];
        for (format, expected) in cases {
            let layout = compile(format, "");
            assert!(layout.tokens().len() <= layout.filtered().len());
            assert_eq!(layout.tokens().len(), expected, "{format:?}");
        }
    }

    #[test]
    fn recompiling_filtered_string_is_a_no_op() {
        let inputs = [
            ("u@h [i:p] d (c) (v) (g)", ""),
            ("u@h [i:p] d", "i"),
            ("gg dd hu", "d"),
            ("p i p", "u"),
            ("", ""),
        ];

        for (format, exclude) in inputs {
            let layout = compile(format, exclude);
            let again = compile(layout.filtered(), "");
            assert_eq!(again.tokens(), layout.tokens(), "{format:?} / {exclude:?}");
        }
    }

    #[test]
    fn first_token_never_has_leading_space() {
        for format in ["d", "gu", " c", "pv"] {
            let layout = compile(format, "");
            assert!(!layout.tokens()[0].leading_space, "{format:?}");
        }
    }
}
