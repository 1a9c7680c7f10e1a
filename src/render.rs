//! Math rendering backends.
//!
//! The terminal cannot typeset, so the default renderer turns common LaTeX
//! into Unicode text (`x^2` becomes `x²`, `\frac{1}{2}` becomes `1/2`). It
//! rejects input a real typesetter would reject: unbalanced braces, dangling
//! scripts and undefined control sequences.

use std::iter::Peekable;
use std::str::Chars;
use thiserror::Error;

/// Deepest group or command nesting the Unicode renderer accepts.
const MAX_NESTING: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("unbalanced braces")]
    UnbalancedBraces,

    #[error("missing argument for {0}")]
    MissingArgument(String),

    #[error("undefined control sequence \\{0}")]
    UndefinedCommand(String),

    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Trait for math renderers.
pub trait MathRenderer {
    /// Render one inline math span. Must not panic on malformed input.
    fn render_inline(&self, latex: &str) -> Result<String, RenderError>;
}

/// Passes LaTeX through untouched. Useful where the source itself should be
/// shown, such as the answer preview in the editor.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceRenderer;

impl MathRenderer for SourceRenderer {
    fn render_inline(&self, latex: &str) -> Result<String, RenderError> {
        Ok(latex.to_string())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeRenderer;

impl UnicodeRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl MathRenderer for UnicodeRenderer {
    fn render_inline(&self, latex: &str) -> Result<String, RenderError> {
        let mut parser = Parser {
            chars: latex.chars().peekable(),
            depth: 0,
        };
        let out = parser.sequence(false)?;
        Ok(out.trim().to_string())
    }
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    depth: usize,
}

impl Parser<'_> {
    fn nested<F>(&mut self, parse: F) -> Result<String, RenderError>
    where
        F: FnOnce(&mut Self) -> Result<String, RenderError>,
    {
        if self.depth >= MAX_NESTING {
            return Err(RenderError::Unsupported(format!(
                "nesting deeper than {} levels",
                MAX_NESTING
            )));
        }
        self.depth += 1;
        let out = parse(self);
        self.depth -= 1;
        out
    }

    /// Render until end of input, or until the closing brace of a group.
    fn sequence(&mut self, in_group: bool) -> Result<String, RenderError> {
        let mut out = String::new();
        loop {
            let Some(c) = self.chars.next() else {
                return if in_group {
                    Err(RenderError::UnbalancedBraces)
                } else {
                    Ok(out)
                };
            };
            match c {
                '}' if in_group => return Ok(out),
                '}' => return Err(RenderError::UnbalancedBraces),
                '{' => out.push_str(&self.nested(|p| p.sequence(true))?),
                '\\' => out.push_str(&self.command()?),
                '^' => {
                    let arg = self.argument("^")?;
                    out.push_str(&to_script(&arg, superscript, '^'));
                }
                '_' => {
                    let arg = self.argument("_")?;
                    out.push_str(&to_script(&arg, subscript, '_'));
                }
                '~' => out.push(' '),
                other => out.push(other),
            }
        }
    }

    /// One argument: a braced group, a control sequence, or a single char.
    fn argument(&mut self, owner: &str) -> Result<String, RenderError> {
        self.skip_spaces();
        match self.chars.next() {
            Some('{') => self.nested(|p| p.sequence(true)),
            Some('\\') => self.nested(Self::command),
            Some('}') | None => Err(RenderError::MissingArgument(owner.to_string())),
            Some(c) => Ok(c.to_string()),
        }
    }

    fn optional_argument(&mut self) -> Result<Option<String>, RenderError> {
        self.skip_spaces();
        if self.chars.peek() != Some(&'[') {
            return Ok(None);
        }
        self.chars.next();
        let mut inner = String::new();
        for c in self.chars.by_ref() {
            if c == ']' {
                let mut nested = Parser {
                    chars: inner.chars().peekable(),
                    depth: self.depth,
                };
                return nested.sequence(false).map(Some);
            }
            inner.push(c);
        }
        Err(RenderError::UnbalancedBraces)
    }

    fn skip_spaces(&mut self) {
        while matches!(self.chars.peek(), Some(c) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn command(&mut self) -> Result<String, RenderError> {
        let mut name = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_alphabetic() {
                name.push(c);
                self.chars.next();
            } else {
                break;
            }
        }

        if name.is_empty() {
            // Control symbol such as \{ or \,
            return match self.chars.next() {
                Some(',') | Some(';') | Some(':') | Some(' ') => Ok(" ".to_string()),
                Some('!') => Ok(String::new()),
                Some('\\') => Ok(" ".to_string()),
                Some(c @ ('{' | '}' | '%' | '$' | '&' | '#' | '_')) => Ok(c.to_string()),
                Some(c) => Err(RenderError::UndefinedCommand(c.to_string())),
                None => Err(RenderError::MissingArgument("\\".to_string())),
            };
        }

        if let Some(symbol) = symbol(&name) {
            // Spaces after a letter-like control word only end the word
            if symbol.chars().all(char::is_alphabetic) {
                self.skip_spaces();
            }
            return Ok(symbol.to_string());
        }

        match name.as_str() {
            "frac" | "dfrac" | "tfrac" => {
                let num = self.argument(&name)?;
                let den = self.argument(&name)?;
                Ok(format!("{}/{}", wrap_compound(&num), wrap_compound(&den)))
            }
            "sqrt" => {
                let index = self.optional_argument()?;
                let radicand = self.argument(&name)?;
                let root = match index.as_deref() {
                    None | Some("2") => "√".to_string(),
                    Some("3") => "∛".to_string(),
                    Some("4") => "∜".to_string(),
                    Some(n) => format!("{}√", to_script(n, superscript, '^')),
                };
                Ok(format!("{}{}", root, wrap_compound(&radicand)))
            }
            "text" | "mathrm" | "mathbf" | "mathit" | "mathsf" | "mathtt" | "operatorname"
            | "textbf" | "textit" | "boldsymbol" | "mathbb" => self.argument(&name),
            "overline" | "bar" => Ok(format!("{}\u{0305}", self.argument(&name)?)),
            "vec" => Ok(format!("{}\u{20D7}", self.argument(&name)?)),
            "hat" => Ok(format!("{}\u{0302}", self.argument(&name)?)),
            "overrightarrow" => Ok(format!("{}\u{20D7}", self.argument(&name)?)),
            "left" | "right" | "big" | "Big" | "bigg" | "Bigg" => {
                // The delimiter that follows is printed as is; `.` means none.
                match self.chars.peek() {
                    Some('.') => {
                        self.chars.next();
                        Ok(String::new())
                    }
                    _ => Ok(String::new()),
                }
            }
            "displaystyle" | "textstyle" | "limits" => Ok(String::new()),
            "quad" => Ok("  ".to_string()),
            "qquad" => Ok("    ".to_string()),
            _ => Err(RenderError::UndefinedCommand(name)),
        }
    }
}

fn wrap_compound(s: &str) -> String {
    if s.chars().count() <= 1 || s.chars().all(|c| c.is_alphanumeric() || c == '.') {
        s.to_string()
    } else {
        format!("({})", s)
    }
}

fn to_script(arg: &str, map: fn(char) -> Option<char>, marker: char) -> String {
    let mapped: Option<String> = arg.chars().map(map).collect();
    match mapped {
        Some(s) => s,
        None if arg.chars().count() == 1 => format!("{}{}", marker, arg),
        None => format!("{}({})", marker, arg),
    }
}

fn superscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '+' => '⁺',
        '-' | '−' => '⁻',
        '=' => '⁼',
        '(' => '⁽',
        ')' => '⁾',
        'n' => 'ⁿ',
        'i' => 'ⁱ',
        'x' => 'ˣ',
        'y' => 'ʸ',
        'a' => 'ᵃ',
        'b' => 'ᵇ',
        'c' => 'ᶜ',
        'd' => 'ᵈ',
        'e' => 'ᵉ',
        'k' => 'ᵏ',
        'm' => 'ᵐ',
        't' => 'ᵗ',
        '∘' => '°',
        _ => return None,
    })
}

fn subscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        '+' => '₊',
        '-' | '−' => '₋',
        '=' => '₌',
        '(' => '₍',
        ')' => '₎',
        'a' => 'ₐ',
        'e' => 'ₑ',
        'i' => 'ᵢ',
        'j' => 'ⱼ',
        'k' => 'ₖ',
        'n' => 'ₙ',
        'o' => 'ₒ',
        'x' => 'ₓ',
        _ => return None,
    })
}

fn symbol(name: &str) -> Option<&'static str> {
    Some(match name {
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" | "varepsilon" => "ε",
        "zeta" => "ζ",
        "eta" => "η",
        "theta" | "vartheta" => "θ",
        "iota" => "ι",
        "kappa" => "κ",
        "lambda" => "λ",
        "mu" => "μ",
        "nu" => "ν",
        "xi" => "ξ",
        "pi" => "π",
        "rho" => "ρ",
        "sigma" => "σ",
        "tau" => "τ",
        "phi" | "varphi" => "φ",
        "chi" => "χ",
        "psi" => "ψ",
        "omega" => "ω",
        "Gamma" => "Γ",
        "Delta" => "Δ",
        "Theta" => "Θ",
        "Lambda" => "Λ",
        "Pi" => "Π",
        "Sigma" => "Σ",
        "Phi" => "Φ",
        "Omega" => "Ω",
        "times" => "×",
        "cdot" => "·",
        "div" => "÷",
        "pm" => "±",
        "mp" => "∓",
        "le" | "leq" => "≤",
        "ge" | "geq" => "≥",
        "ne" | "neq" => "≠",
        "approx" => "≈",
        "equiv" => "≡",
        "sim" => "∼",
        "infty" => "∞",
        "sum" => "∑",
        "prod" => "∏",
        "int" => "∫",
        "partial" => "∂",
        "nabla" => "∇",
        "to" | "rightarrow" => "→",
        "leftarrow" => "←",
        "Rightarrow" | "implies" => "⇒",
        "Leftrightarrow" | "iff" => "⇔",
        "in" => "∈",
        "notin" => "∉",
        "subset" => "⊂",
        "subseteq" => "⊆",
        "cup" => "∪",
        "cap" => "∩",
        "emptyset" => "∅",
        "forall" => "∀",
        "exists" => "∃",
        "angle" => "∠",
        "degree" => "°",
        "circ" => "∘",
        "perp" => "⊥",
        "parallel" => "∥",
        "triangle" => "△",
        "cdots" => "⋯",
        "ldots" | "dots" => "…",
        "prime" => "′",
        "lt" => "<",
        "gt" => ">",
        "sin" => "sin",
        "cos" => "cos",
        "tan" => "tan",
        "log" => "log",
        "ln" => "ln",
        "exp" => "exp",
        "lim" => "lim",
        "max" => "max",
        "min" => "min",
        _ => return None,
    })
}
