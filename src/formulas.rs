//! Ready-made formulas the editor can drop into question text.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variable {
    pub name: char,
    pub default: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Formula {
    pub id: &'static str,
    pub name: &'static str,
    pub template: &'static str,
    pub variables: &'static [Variable],
}

const fn var(name: char, default: f64) -> Variable {
    Variable { name, default }
}

pub const LIBRARY: [Formula; 4] = [
    Formula {
        id: "linear_1",
        name: "Linear equation",
        template: "y = mx + b",
        variables: &[var('m', 1.0), var('b', 0.0)],
    },
    Formula {
        id: "quadratic_1",
        name: "Quadratic equation",
        template: "y = ax^2 + bx + c",
        variables: &[var('a', 1.0), var('b', 0.0), var('c', 0.0)],
    },
    Formula {
        id: "circle_1",
        name: "Circle",
        template: "(x - h)^2 + (y - k)^2 = r^2",
        variables: &[var('h', 0.0), var('k', 0.0), var('r', 5.0)],
    },
    Formula {
        id: "sine_wave",
        name: "Sine wave",
        template: "y = A \\sin(Bx + C)",
        variables: &[var('A', 1.0), var('B', 1.0), var('C', 0.0)],
    },
];

pub fn find(id: &str) -> Option<&'static Formula> {
    LIBRARY.iter().find(|f| f.id == id)
}

impl Formula {
    pub fn defaults(&self) -> BTreeMap<char, f64> {
        self.variables.iter().map(|v| (v.name, v.default)).collect()
    }

    /// Substitute variable values into the template. Letters that belong to
    /// a control word such as `\sin` are left alone; a variable without a
    /// value keeps its default.
    pub fn instantiate(&self, values: &BTreeMap<char, f64>) -> String {
        let mut out = String::with_capacity(self.template.len() + 8);
        let mut in_command = false;

        for c in self.template.chars() {
            if c == '\\' {
                in_command = true;
                out.push(c);
                continue;
            }
            if in_command && c.is_ascii_alphabetic() {
                out.push(c);
                continue;
            }
            in_command = false;

            match self.variables.iter().find(|v| v.name == c) {
                Some(variable) => {
                    let value = values.get(&c).copied().unwrap_or(variable.default);
                    out.push_str(&format_number(value));
                }
                None => out.push(c),
            }
        }
        out
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
