//! Main-axis sizing and placement for a single flex line.

use crate::scalar::LayoutScalar;
use trellis_core::{Alignment, Distribution};

/// One child's main-axis sizing inputs and result.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FlexItem<S> {
    /// Size before grow or shrink.
    pub base: S,
    /// Size used for line breaking; growers report their intrinsic size.
    pub hypothetical: S,
    /// Main-axis margins on both sides.
    pub margin: S,
    pub grow: f64,
    pub shrink: f64,
    /// Only auto-sized children take part in grow and shrink.
    pub flexible: bool,
    pub min: Option<S>,
    pub max: Option<S>,
    /// Final main size.
    pub main: S,
}

impl<S: LayoutScalar> FlexItem<S> {
    fn grows(&self) -> bool {
        self.flexible && self.grow > 0.0
    }

    fn clamp(&self, value: S) -> S {
        clamp_size(value, self.min, self.max)
    }
}

/// Apply max then min, never going below zero.
pub(crate) fn clamp_size<S: LayoutScalar>(value: S, min: Option<S>, max: Option<S>) -> S {
    let mut value = value;
    if let Some(max) = max {
        value = value.min(max);
    }
    if let Some(min) = min {
        value = value.max(min);
    }
    value.non_negative()
}

/// Sum of sizes plus the gaps between them.
pub(crate) fn used_space<S: LayoutScalar>(sizes: impl Iterator<Item = S>, gap: S) -> S {
    let mut total = S::ZERO;
    let mut count = 0usize;
    for size in sizes {
        total = total + size;
        count += 1;
    }
    if count > 1 {
        total = total + gap.mul(S::from_count(count - 1));
    }
    total
}

/// Resolve the final main size of every item in a line.
///
/// Growers split the free space by weight in whole units. Whole units lost
/// to flooring go one each to growers in order; the sub-unit remainder goes
/// to the first grower, so the shares sum to the free space exactly. When
/// nothing grows and the line overflows, flexible items shrink in
/// proportion to `shrink * base`.
///
/// Returns whether any item grew.
pub(crate) fn distribute<S: LayoutScalar>(items: &mut [FlexItem<S>], available: S, gap: S) -> bool {
    for item in items.iter_mut() {
        item.main = item.clamp(item.base);
    }

    let used = used_space(items.iter().map(|i| i.main + i.margin), gap);
    let free = available - used;
    let total_grow: f64 = items.iter().filter(|i| i.grows()).map(|i| i.grow).sum();

    if total_grow > 0.0 {
        let free = free.non_negative();
        grow(items, free, total_grow);
        return true;
    }

    if free < S::ZERO {
        shrink(items, S::ZERO - free);
    }
    false
}

fn grow<S: LayoutScalar>(items: &mut [FlexItem<S>], free: S, total_grow: f64) {
    let total = S::from_f64(total_grow);
    let mut given = S::ZERO;
    for item in items.iter_mut().filter(|i| i.grows()) {
        let share = free.mul(S::from_f64(item.grow)).div(total).floor();
        item.main = item.main + share;
        given = given + share;
    }

    let mut leftover = free - given;
    for item in items.iter_mut().filter(|i| i.grows()) {
        if leftover < S::UNIT {
            break;
        }
        item.main = item.main + S::UNIT;
        leftover = leftover - S::UNIT;
    }
    if let Some(first) = items.iter_mut().find(|i| i.grows()) {
        first.main = first.main + leftover;
    }

    for item in items.iter_mut().filter(|i| i.grows()) {
        item.main = item.clamp(item.main);
    }
}

fn shrink<S: LayoutScalar>(items: &mut [FlexItem<S>], overflow: S) {
    let weight = |i: &FlexItem<S>| i.main.mul(S::from_f64(i.shrink));
    let shrinkers = |i: &&mut FlexItem<S>| i.flexible && i.shrink > 0.0 && i.main > S::ZERO;

    let total = items
        .iter_mut()
        .filter(shrinkers)
        .fold(S::ZERO, |acc, i| acc + weight(&*i));
    if total <= S::ZERO {
        return;
    }

    for item in items.iter_mut().filter(shrinkers) {
        let cut = overflow.mul(weight(&*item)).div(total);
        item.main = item.clamp(item.main - cut);
    }
}

/// Offset of each item from the line start along the main axis.
///
/// Distribution only applies when space remains; otherwise items pack from
/// the start separated by `gap`.
pub(crate) fn main_offsets<S: LayoutScalar>(
    distribution: Distribution,
    sizes: &[S],
    available: S,
    gap: S,
) -> Vec<S> {
    let n = sizes.len();
    let extra = (available - used_space(sizes.iter().copied(), gap)).non_negative();

    let (start, between) = match distribution {
        Distribution::Start => (S::ZERO, gap),
        Distribution::End => (extra, gap),
        Distribution::Center => (extra.half(), gap),
        Distribution::SpaceBetween if n > 1 => (S::ZERO, gap + extra.div(S::from_count(n - 1))),
        Distribution::SpaceAround if n > 0 => {
            let space = extra.div(S::from_count(n));
            (space.half(), gap + space)
        }
        Distribution::SpaceEvenly if n > 0 => {
            let space = extra.div(S::from_count(n + 1));
            (space, gap + space)
        }
        _ => (S::ZERO, gap),
    };

    let mut offsets = Vec::with_capacity(n);
    let mut cursor = start;
    for size in sizes {
        offsets.push(cursor);
        cursor = cursor + *size + between;
    }
    offsets
}

/// Offset of an item within `extent` on the cross axis. Zero when the item
/// does not fit.
pub(crate) fn cross_offset<S: LayoutScalar>(alignment: Alignment, size: S, extent: S) -> S {
    let room = extent - size;
    if room <= S::ZERO {
        return S::ZERO;
    }
    match alignment {
        Alignment::Start | Alignment::Stretch => S::ZERO,
        Alignment::Center => room.half(),
        Alignment::End => room,
    }
}
