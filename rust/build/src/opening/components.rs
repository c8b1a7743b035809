// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Opening component strings and span widths.
//!
//! An opening is a left to right list of doors and windows, written either
//! as letters (`"wdw"`) or as words (`"window,door,window"`). Runs of the
//! same kind are clubbed into one group that shares a single wider span,
//! so the frame bar between two neighbouring windows is drawn once.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Door,
    Window,
}

/// A run of adjacent components of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentGroup {
    pub kind: ComponentKind,
    pub count: usize,
}

/// Parses a component string into clubbed groups.
pub fn parse_components(text: &str) -> Result<Vec<ComponentGroup>> {
    let kinds = if text.contains(',') {
        text.split(',')
            .map(str::trim)
            .filter(|word| !word.is_empty())
            .map(parse_word)
            .collect::<Result<Vec<_>>>()?
    } else {
        text.chars()
            .filter(|c| !c.is_whitespace())
            .map(parse_letter)
            .collect::<Result<Vec<_>>>()?
    };

    let mut groups: Vec<ComponentGroup> = Vec::new();
    for kind in kinds {
        match groups.last_mut() {
            Some(last) if last.kind == kind => last.count += 1,
            _ => groups.push(ComponentGroup { kind, count: 1 }),
        }
    }
    if groups.is_empty() {
        return Err(Error::EmptyComponents);
    }
    Ok(groups)
}

fn parse_letter(c: char) -> Result<ComponentKind> {
    match c.to_ascii_lowercase() {
        'd' => Ok(ComponentKind::Door),
        'w' => Ok(ComponentKind::Window),
        other => Err(Error::UnsupportedComponent(other)),
    }
}

fn parse_word(word: &str) -> Result<ComponentKind> {
    match word.to_ascii_lowercase().as_str() {
        "door" | "d" => Ok(ComponentKind::Door),
        "window" | "w" => Ok(ComponentKind::Window),
        _ => Err(Error::UnsupportedComponent(word.chars().next().unwrap_or(' '))),
    }
}

/// Components of `kind` across all groups.
pub fn count_of(groups: &[ComponentGroup], kind: ComponentKind) -> usize {
    groups.iter().filter(|g| g.kind == kind).map(|g| g.count).sum()
}

/// Leaf widths solved from one span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafWidths {
    pub door: f64,
    pub window: f64,
}

impl LeafWidths {
    pub fn of(&self, kind: ComponentKind) -> f64 {
        match kind {
            ComponentKind::Door => self.door,
            ComponentKind::Window => self.window,
        }
    }
}

/// Solves `doors * w + windows * ratio * w + margin * (n + 1) = span`.
pub fn leaf_widths(groups: &[ComponentGroup], span: f64, margin: f64, ratio: f64) -> LeafWidths {
    let doors = count_of(groups, ComponentKind::Door) as f64;
    let windows = count_of(groups, ComponentKind::Window) as f64;
    let usable = span - margin * (doors + windows + 1.0);
    let door = usable / (doors + ratio * windows);
    LeafWidths {
        door,
        window: ratio * door,
    }
}

/// Span of one clubbed group, including the frame bars it owns.
///
/// Doors carry bars on both sides. Windows drop the bar they share with a
/// neighbouring group: one at either end of the opening, two in the middle.
pub fn clubbed_width(group: ComponentGroup, widths: &LeafWidths, margin: f64, first: bool, last: bool) -> f64 {
    let c = group.count as f64;
    let leaves = widths.of(group.kind) * c;
    let bars = match group.kind {
        ComponentKind::Door => c + 1.0,
        ComponentKind::Window if first && last => c + 1.0,
        ComponentKind::Window if first || last => c,
        ComponentKind::Window => c - 1.0,
    };
    leaves + margin * bars
}

/// Clubbed spans of every group, left to right.
pub fn clubbed_widths(groups: &[ComponentGroup], widths: &LeafWidths, margin: f64) -> Vec<f64> {
    let n = groups.len();
    groups
        .iter()
        .enumerate()
        .map(|(i, &g)| clubbed_width(g, widths, margin, i == 0, i + 1 == n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DOOR: ComponentKind = ComponentKind::Door;
    const WINDOW: ComponentKind = ComponentKind::Window;

    #[test]
    fn letters_and_words_parse_alike() {
        let letters = parse_components("wdw").unwrap();
        let words = parse_components("window, door ,window").unwrap();
        assert_eq!(letters, words);
        assert_eq!(letters.len(), 3);
        assert_eq!(letters[1].kind, DOOR);
    }

    #[test]
    fn runs_are_clubbed() {
        let groups = parse_components("wwddw").unwrap();
        assert_eq!(
            groups,
            vec![
                ComponentGroup { kind: WINDOW, count: 2 },
                ComponentGroup { kind: DOOR, count: 2 },
                ComponentGroup { kind: WINDOW, count: 1 },
            ]
        );
        assert_eq!(count_of(&groups, WINDOW), 3);
    }

    #[test]
    fn bad_components_are_rejected() {
        assert!(matches!(parse_components(""), Err(Error::EmptyComponents)));
        assert!(matches!(parse_components("dxw"), Err(Error::UnsupportedComponent('x'))));
        assert!(matches!(
            parse_components("door,gate"),
            Err(Error::UnsupportedComponent('g'))
        ));
    }

    #[test]
    fn joint_equation_couples_widths() {
        let groups = parse_components("window,door,window").unwrap();
        let widths = leaf_widths(&groups, 2.0, 0.05, 1.2);
        assert_relative_eq!(widths.door, widths.window / 1.2, epsilon = 1e-12);
        let total = widths.door + 2.0 * widths.window + 4.0 * 0.05;
        assert_relative_eq!(total, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn clubbed_spans_fill_the_opening() {
        for text in ["d", "w", "dd", "ww", "wdw", "dwd", "wd", "dw", "wwddw", "dwwd", "wwdwwdww"] {
            let groups = parse_components(text).unwrap();
            let widths = leaf_widths(&groups, 3.0, 0.05, 1.3);
            let spans = clubbed_widths(&groups, &widths, 0.05);
            assert_relative_eq!(spans.iter().sum::<f64>(), 3.0, epsilon = 1e-9);
        }
    }
}
