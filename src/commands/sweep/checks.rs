use super::*;

#[derive(Debug, Clone, Copy)]
pub struct CheckContext {
    pub viewport: Viewport,
    pub tolerance_px: f64,
    pub overflow_cap: usize,
}

pub trait SlideCheck {
    fn kind(&self) -> IssueKind;
    fn inspect(&self, slide: &SlideSnapshot, ctx: &CheckContext) -> Vec<String>;
}

pub struct BrokenImageCheck;

impl SlideCheck for BrokenImageCheck {
    fn kind(&self) -> IssueKind {
        IssueKind::BrokenImage
    }

    fn inspect(&self, slide: &SlideSnapshot, _ctx: &CheckContext) -> Vec<String> {
        slide
            .images
            .iter()
            .filter(|image| !image.src.is_empty())
            .filter(|image| {
                !image.complete || image.natural_width == 0.0 || image.natural_height == 0.0
            })
            .map(|image| image.src.clone())
            .collect()
    }
}

pub struct NotVisibleCheck;

impl SlideCheck for NotVisibleCheck {
    fn kind(&self) -> IssueKind {
        IssueKind::NotVisible
    }

    fn inspect(&self, slide: &SlideSnapshot, ctx: &CheckContext) -> Vec<String> {
        let rect = match (slide.present, slide.slide_rect) {
            (true, Some(rect)) => rect,
            _ => return vec!["slide section not found in the document".to_string()],
        };

        let too_small = rect.width < MIN_VISIBLE_EDGE_PX || rect.height < MIN_VISIBLE_EDGE_PX;
        if too_small || rect.lies_outside(ctx.viewport, ctx.tolerance_px) {
            return vec![format!(
                "slide section is not visible or nearly zero-sized ({}x{} at {},{})",
                rect.width.round(),
                rect.height.round(),
                rect.left.round(),
                rect.top.round()
            )];
        }
        Vec::new()
    }
}

pub struct OverflowCheck;

impl SlideCheck for OverflowCheck {
    fn kind(&self) -> IssueKind {
        IssueKind::Overflow
    }

    fn inspect(&self, slide: &SlideSnapshot, ctx: &CheckContext) -> Vec<String> {
        let offenders: Vec<String> = slide
            .out_of_bounds
            .iter()
            .filter(|element| element.rect.width > 0.0 && element.rect.height > 0.0)
            .filter(|element| element.rect.exceeds(ctx.viewport, ctx.tolerance_px))
            .map(describe_element)
            .collect();

        if offenders.is_empty() {
            return Vec::new();
        }
        vec![summarize_capped(&offenders, ctx.overflow_cap)]
    }
}

pub struct FontMismatchCheck;

impl SlideCheck for FontMismatchCheck {
    fn kind(&self) -> IssueKind {
        IssueKind::FontMismatch
    }

    fn inspect(&self, slide: &SlideSnapshot, _ctx: &CheckContext) -> Vec<String> {
        slide
            .font_groups
            .iter()
            .filter(|group| group.sizes.len() >= 2)
            .filter_map(|group| {
                let mut distinct: Vec<&str> = Vec::new();
                for size in &group.sizes {
                    if !distinct.contains(&size.as_str()) {
                        distinct.push(size);
                    }
                }
                (distinct.len() > 1).then(|| {
                    format!(
                        "{}: different font sizes on the same slide ({})",
                        group.selector,
                        distinct.join(", ")
                    )
                })
            })
            .collect()
    }
}

pub struct IconConsistencyCheck;

impl SlideCheck for IconConsistencyCheck {
    fn kind(&self) -> IssueKind {
        IssueKind::IconMissing
    }

    fn inspect(&self, slide: &SlideSnapshot, _ctx: &CheckContext) -> Vec<String> {
        slide
            .icon_grids
            .iter()
            .filter(|grid| grid.cards_with_icon.len() >= 2)
            .filter_map(|grid| {
                let with = grid.cards_with_icon.iter().filter(|has| **has).count();
                let without = grid.cards_with_icon.len() - with;
                (with > 0 && without > 0).then(|| {
                    format!(
                        "{}: {with} with icon/badge, {without} without (same grid)",
                        grid.container
                    )
                })
            })
            .collect()
    }
}

pub struct CardHeightCheck;

impl SlideCheck for CardHeightCheck {
    fn kind(&self) -> IssueKind {
        IssueKind::CardHeightMismatch
    }

    fn inspect(&self, slide: &SlideSnapshot, _ctx: &CheckContext) -> Vec<String> {
        slide
            .card_grids
            .iter()
            .filter(|grid| grid.heights.len() >= 2)
            .filter_map(|grid| {
                let rounded: Vec<i64> = grid.heights.iter().map(|h| h.round() as i64).collect();
                let unique: BTreeSet<i64> = rounded.iter().copied().collect();
                let (min, max) = (unique.first()?, unique.last()?);
                (unique.len() > 1).then(|| {
                    let listed = rounded
                        .iter()
                        .map(|h| format!("{h}px"))
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!(
                        "{}[{}]: {} cards with different heights ({listed}), spread {}px",
                        grid.container,
                        grid.instance,
                        rounded.len(),
                        max - min
                    )
                })
            })
            .collect()
    }
}

pub struct DiagramCheck;

impl SlideCheck for DiagramCheck {
    fn kind(&self) -> IssueKind {
        IssueKind::DiagramLayout
    }

    fn inspect(&self, slide: &SlideSnapshot, ctx: &CheckContext) -> Vec<String> {
        let width = f64::from(ctx.viewport.width);
        let height = f64::from(ctx.viewport.height);
        let scrolls = slide.document_scroll_width > width;

        let mut details = Vec::new();
        for (index, diagram) in slide.diagrams.iter().enumerate() {
            let rect = &diagram.rect;
            let label = format!("diagram {index} ({})", diagram.src);
            if rect.width > width || rect.height > height {
                details.push(format!(
                    "{label}: overflows viewport ({}x{})",
                    rect.width.round() as i64,
                    rect.height.round() as i64
                ));
            }
            if scrolls {
                details.push(format!("{label}: causes horizontal scroll"));
            }
            if rect.width < MIN_DIAGRAM_WIDTH_PX {
                details.push(format!(
                    "{label}: too small ({}px width)",
                    rect.width.round() as i64
                ));
            }
        }
        details
    }
}

pub fn checks_for(kinds: &[CheckKind]) -> Vec<Box<dyn SlideCheck>> {
    let mut seen = BTreeSet::new();
    kinds
        .iter()
        .filter(|kind| seen.insert(kind.issue_kind()))
        .filter_map(|kind| -> Option<Box<dyn SlideCheck>> {
            match kind {
                CheckKind::BrokenImage => Some(Box::new(BrokenImageCheck)),
                CheckKind::NotVisible => Some(Box::new(NotVisibleCheck)),
                CheckKind::Overflow => Some(Box::new(OverflowCheck)),
                CheckKind::FontMismatch => Some(Box::new(FontMismatchCheck)),
                CheckKind::IconMissing => Some(Box::new(IconConsistencyCheck)),
                CheckKind::CardHeight => Some(Box::new(CardHeightCheck)),
                CheckKind::Diagram => Some(Box::new(DiagramCheck)),
                CheckKind::ConsoleError => None,
            }
        })
        .collect()
}

pub fn describe_element(element: &ElementProbe) -> String {
    let mut label = element.tag.to_lowercase();
    if !element.id.is_empty() {
        label.push('#');
        label.push_str(&element.id);
    }
    if let Some(class) = element.class_name.split_whitespace().next() {
        label.push('.');
        label.push_str(class);
    }

    let rect = &element.rect;
    format!(
        "{label} (L:{} R:{} T:{} B:{})",
        rect.left.round() as i64,
        rect.right.round() as i64,
        rect.top.round() as i64,
        rect.bottom.round() as i64
    )
}

pub fn summarize_capped(items: &[String], cap: usize) -> String {
    let cap = cap.max(1);
    let shown = items.iter().take(cap).cloned().collect::<Vec<_>>().join("; ");
    if items.len() > cap {
        format!("{shown} (+{} more)", items.len() - cap)
    } else {
        shown
    }
}
