use super::*;

const FONT_GROUPS: &[&str] = &[
    ".quality-card h4",
    ".quality-card p",
    ".result-card .result-desc",
    ".criteria-card h4",
    ".criteria-card p",
    ".agenda-content h4",
    ".agenda-content p",
    ".conclusion-item p",
];

const ICON_GRIDS: &[(&str, &str, &str)] = &[
    (".quality-grid", ".quality-card", ".quality-icon"),
    (".results-grid", ".result-card", ".result-icon"),
    (".criteria-grid", ".criteria-card", ".criteria-icon"),
    (".agenda-grid", ".agenda-item", ".agenda-number"),
    (".conclusions-list", ".conclusion-item", ".conclusion-icon"),
];

const CARD_GRIDS: &[&str] = &[".problem-grid", ".agenda-grid", ".tech-grid", ".cec-grid"];
const CARD_SELECTOR: &str = ".problem-card, .agenda-item, .tech-card, .cec-card";
const DIAGRAM_SELECTOR: &str = ".diagram-img, img[src*=\"diagram\"], img[src*=\"arquitectura\"], \
    img[src*=\"cronologia\"], img[src*=\"gitflow\"]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorCatalog {
    pub font_groups: Vec<String>,
    pub icon_grids: Vec<IconGridSpec>,
    pub card_grids: Vec<CardGridSpec>,
    pub diagram_selector: String,
}

impl Default for SelectorCatalog {
    fn default() -> Self {
        Self {
            font_groups: FONT_GROUPS.iter().map(|s| s.to_string()).collect(),
            icon_grids: ICON_GRIDS
                .iter()
                .map(|(container, card, icon)| IconGridSpec {
                    container: container.to_string(),
                    card: card.to_string(),
                    icon: icon.to_string(),
                })
                .collect(),
            card_grids: CARD_GRIDS
                .iter()
                .map(|container| CardGridSpec {
                    container: container.to_string(),
                    cards: CARD_SELECTOR.to_string(),
                })
                .collect(),
            diagram_selector: DIAGRAM_SELECTOR.to_string(),
        }
    }
}

impl SelectorCatalog {
    pub fn probe_request(
        &self,
        index: usize,
        viewport: Viewport,
        enabled: &BTreeSet<IssueKind>,
    ) -> ProbeRequest {
        let wants = |kind| enabled.contains(&kind);
        ProbeRequest {
            index,
            viewport,
            font_groups: if wants(IssueKind::FontMismatch) {
                self.font_groups.clone()
            } else {
                Vec::new()
            },
            icon_grids: if wants(IssueKind::IconMissing) {
                self.icon_grids.clone()
            } else {
                Vec::new()
            },
            card_grids: if wants(IssueKind::CardHeightMismatch) {
                self.card_grids.clone()
            } else {
                Vec::new()
            },
            diagram_selector: wants(IssueKind::DiagramLayout)
                .then(|| self.diagram_selector.clone()),
        }
    }
}
