//! # Knuth-Plass Line Breaking
//!
//! Chooses break points for a whole paragraph at once by minimizing the sum
//! of per-line demerits, instead of greedily filling each line. The result is
//! a more even right edge.
//!
//! Lines are set ragged (glue is never shrunk), so a line is only feasible
//! when its natural width fits. Stretch is used purely to score how loose a
//! line is.

use unicode_linebreak::BreakOpportunity;

use super::{compute_break_opportunities, make_span, LineSpan};

/// An item in the Knuth-Plass item list.
#[derive(Debug, Clone)]
pub enum Item {
    /// A fixed-width content box (word fragment, character).
    Box {
        width: f64,
        /// Char range [start, end) in the original char array.
        char_start: usize,
        char_end: usize,
    },
    /// Stretchable space (typically a word space).
    Glue {
        width: f64,
        stretch: f64,
        /// Char index this glue corresponds to in the original text.
        char_index: usize,
    },
    /// A potential break point with a cost.
    Penalty {
        penalty: f64,
        /// Char index where this penalty sits.
        char_index: usize,
    },
}

/// Configuration for the Knuth-Plass algorithm.
#[derive(Debug, Clone)]
pub struct Config {
    pub line_width: f64,
    /// How much lines are allowed to stretch. Higher = more tolerance.
    pub tolerance: f64,
    /// Extra demerits for adjacent lines with very different tightness.
    pub fitness_demerits: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            line_width: 0.0,
            tolerance: 2.0,
            fitness_demerits: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FitnessClass {
    Normal = 0,
    Loose = 1,
    VeryLoose = 2,
}

fn fitness_class(ratio: f64) -> FitnessClass {
    if ratio <= 0.5 {
        FitnessClass::Normal
    } else if ratio <= 1.0 {
        FitnessClass::Loose
    } else {
        FitnessClass::VeryLoose
    }
}

/// An active breakpoint in the DP.
#[derive(Debug, Clone)]
struct Breakpoint {
    /// Index in the items array where this break occurs.
    item_index: usize,
    fitness: FitnessClass,
    /// Totals from the start of the paragraph up to (after) this break.
    total_width: f64,
    total_stretch: f64,
    total_demerits: f64,
    /// Previous breakpoint in the chain, for backtracking.
    prev: Option<usize>,
}

/// Convert chars with pre-computed widths into the box/glue/penalty list.
pub fn build_items(
    chars: &[char],
    char_widths: &[f64],
    break_opps: &[Option<BreakOpportunity>],
) -> Vec<Item> {
    let mut items = Vec::new();
    let mut box_start = 0;
    let mut box_width = 0.0;

    for (i, &ch) in chars.iter().enumerate() {
        // Non-space break opportunities (CJK, after hyphens) become free penalties
        if i > 0 && break_opps[i].is_some() && chars[i - 1] != ' ' && ch != ' ' {
            if box_width > 0.0 {
                items.push(Item::Box {
                    width: box_width,
                    char_start: box_start,
                    char_end: i,
                });
                box_width = 0.0;
                box_start = i;
            }
            items.push(Item::Penalty {
                penalty: 0.0,
                char_index: i,
            });
        }

        if ch == ' ' || ch == '\t' {
            if box_width > 0.0 {
                items.push(Item::Box {
                    width: box_width,
                    char_start: box_start,
                    char_end: i,
                });
                box_width = 0.0;
            }
            let w = char_widths[i];
            items.push(Item::Glue {
                width: w,
                stretch: w * 0.5,
                char_index: i,
            });
            box_start = i + 1;
            continue;
        }

        box_width += char_widths[i];
    }

    if box_width > 0.0 {
        items.push(Item::Box {
            width: box_width,
            char_start: box_start,
            char_end: chars.len(),
        });
    }

    // Final forced break (the paragraph must end)
    items.push(Item::Glue {
        width: 0.0,
        stretch: 1e6,
        char_index: chars.len(),
    });
    items.push(Item::Penalty {
        penalty: f64::NEG_INFINITY,
        char_index: chars.len(),
    });

    items
}

/// Find optimal break points. Returns the item index of each line's break,
/// or `None` if no feasible solution exists.
pub fn find_breaks(items: &[Item], config: &Config) -> Option<Vec<usize>> {
    let mut breakpoints: Vec<Breakpoint> = vec![Breakpoint {
        item_index: 0,
        fitness: FitnessClass::Normal,
        total_width: 0.0,
        total_stretch: 0.0,
        total_demerits: 0.0,
        prev: None,
    }];
    let mut active: Vec<usize> = vec![0];

    let mut total_width = 0.0;
    let mut total_stretch = 0.0;

    for (i, item) in items.iter().enumerate() {
        // Glue breaks happen before the glue, penalty breaks at the penalty
        let is_break = match item {
            Item::Penalty { penalty, .. } => *penalty < f64::INFINITY,
            Item::Glue { .. } => i > 0 && matches!(items[i - 1], Item::Box { .. }),
            Item::Box { .. } => false,
        };

        if is_break {
            let mut best_by_fitness: [Option<(f64, usize)>; 3] = [None; 3];
            let mut deactivate = Vec::new();

            for &a_idx in &active {
                let a = &breakpoints[a_idx];
                let line_width = total_width - a.total_width;
                let line_stretch = total_stretch - a.total_stretch;
                let target = config.line_width;

                if line_width > target {
                    // Overfull, and every later break from here only gets wider
                    deactivate.push(a_idx);
                    continue;
                }

                let ratio = if line_width < target {
                    if line_stretch > 0.0 {
                        (target - line_width) / line_stretch
                    } else {
                        f64::INFINITY
                    }
                } else {
                    0.0
                };
                if ratio > config.tolerance {
                    continue;
                }

                let penalty = match item {
                    Item::Penalty { penalty, .. } => *penalty,
                    _ => 0.0,
                };
                let badness = 100.0 * ratio.abs().powi(3);
                let mut demerits = if penalty >= 0.0 {
                    (1.0 + badness + penalty).powi(2)
                } else {
                    (1.0 + badness).powi(2)
                };

                let fc = fitness_class(ratio);
                if (fc as i32 - a.fitness as i32).abs() > 1 {
                    demerits += config.fitness_demerits;
                }

                let total = a.total_demerits + demerits;
                let slot = fc as usize;
                if best_by_fitness[slot].map_or(true, |(best, _)| total < best) {
                    best_by_fitness[slot] = Some((total, a_idx));
                }
            }

            active.retain(|idx| !deactivate.contains(idx));

            // A glue break consumes the glue
            let (after_width, after_stretch) = match item {
                Item::Glue { width, stretch, .. } => {
                    (total_width + width, total_stretch + stretch)
                }
                _ => (total_width, total_stretch),
            };

            for (slot, best) in best_by_fitness.iter().enumerate() {
                if let Some((total_demerits, prev_idx)) = best {
                    active.push(breakpoints.len());
                    breakpoints.push(Breakpoint {
                        item_index: i,
                        fitness: match slot {
                            0 => FitnessClass::Normal,
                            1 => FitnessClass::Loose,
                            _ => FitnessClass::VeryLoose,
                        },
                        total_width: after_width,
                        total_stretch: after_stretch,
                        total_demerits: *total_demerits,
                        prev: Some(*prev_idx),
                    });
                }
            }

            if active.is_empty() {
                return None;
            }
        }

        match item {
            Item::Box { width, .. } => total_width += width,
            Item::Glue { width, stretch, .. } => {
                total_width += width;
                total_stretch += stretch;
            }
            Item::Penalty { .. } => {}
        }
    }

    // The solution must end at the forced paragraph-ending break
    let last_item = items.len() - 1;
    let best_final = active
        .iter()
        .copied()
        .filter(|&idx| breakpoints[idx].item_index == last_item && breakpoints[idx].prev.is_some())
        .min_by(|&a, &b| {
            breakpoints[a]
                .total_demerits
                .partial_cmp(&breakpoints[b].total_demerits)
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;

    let mut breaks = Vec::new();
    let mut current = Some(best_final);
    while let Some(idx) = current {
        let bp = &breakpoints[idx];
        if bp.prev.is_some() {
            breaks.push(bp.item_index);
        }
        current = bp.prev;
    }
    breaks.reverse();
    Some(breaks)
}

/// Break one paragraph (no mandatory breaks inside) into line spans.
pub fn break_paragraph(chars: &[char], char_widths: &[f64], max_width: f64) -> Option<Vec<LineSpan>> {
    let text: String = chars.iter().collect();
    let break_opps = compute_break_opportunities(&text);
    let items = build_items(chars, char_widths, &break_opps);
    let config = Config {
        line_width: max_width,
        ..Default::default()
    };
    let breaks = find_breaks(&items, &config)?;

    let mut spans = Vec::with_capacity(breaks.len());
    let mut line_start = 0;
    for break_item in breaks {
        let (end, next_start) = match items[break_item] {
            Item::Glue { char_index, .. } => (char_index, char_index + 1),
            Item::Penalty { char_index, .. } => (char_index, char_index),
            Item::Box { char_end, .. } => (char_end, char_end),
        };
        let end = end.min(chars.len());
        spans.push(make_span(chars, char_widths, line_start, end));
        line_start = next_start.min(chars.len());
    }
    // The final glue/penalty pair can leave an empty trailing line
    if spans.len() > 1 && spans.last().is_some_and(|s| s.start == s.end) {
        spans.pop();
    }
    Some(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items_for(text: &str) -> (Vec<char>, Vec<f64>, Vec<Item>) {
        let chars: Vec<char> = text.chars().collect();
        let widths = vec![10.0; chars.len()];
        let opps = compute_break_opportunities(text);
        let items = build_items(&chars, &widths, &opps);
        (chars, widths, items)
    }

    #[test]
    fn test_items_box_glue_box() {
        let (_, _, items) = items_for("ab cd");
        assert!(matches!(items[0], Item::Box { char_start: 0, char_end: 2, .. }));
        assert!(matches!(items[1], Item::Glue { char_index: 2, .. }));
        assert!(matches!(items[2], Item::Box { char_start: 3, char_end: 5, .. }));
        assert!(matches!(
            items.last(),
            Some(Item::Penalty { penalty, .. }) if *penalty == f64::NEG_INFINITY
        ));
    }

    #[test]
    fn test_single_line_paragraph() {
        let (chars, widths, _) = items_for("ab cd");
        let spans = break_paragraph(&chars, &widths, 100.0).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].start, spans[0].end), (0, 5));
        assert_eq!(spans[0].width, 50.0);
    }

    #[test]
    fn test_prefers_even_lines() {
        // Greedy would take "aaa bb" then "cccccc", KP is free to do the same
        // or better, but never exceeds the width.
        let (chars, widths, _) = items_for("aaa bb cccccc");
        let spans = break_paragraph(&chars, &widths, 70.0).unwrap();
        assert_eq!(spans.len(), 2);
        assert!(spans.iter().all(|s| s.width <= 70.0));
    }

    #[test]
    fn test_infeasible_returns_none() {
        let (chars, widths, _) = items_for("abcdefgh");
        assert!(break_paragraph(&chars, &widths, 30.0).is_none());
    }
}
