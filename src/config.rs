use crate::error::{Error, Result, read_to_string};
use crate::ir::CardVariant;
use crate::layout::CardSize;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardMetrics {
    pub small: CardSize,
    pub full: CardSize,
}

impl Default for CardMetrics {
    fn default() -> Self {
        Self {
            small: CardSize::new(220.0, 110.0),
            full: CardSize::new(320.0, 200.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub canvas_margin: f32,
    pub cluster_gap_x: f32,
    pub level_gap_x: f32,
    pub row_gap_y: f32,
    pub cluster_padding_x: f32,
    pub cluster_padding_y: f32,
    pub label_height: f32,
    pub min_canvas_width: f32,
    pub min_canvas_height: f32,
    /// Multiple of `level_gap_x` between unrelated trees of one cluster.
    pub root_gap_factor: f32,
    pub cards: CardMetrics,
    pub default_variant: CardVariant,
    pub fallback_cluster_label: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas_margin: 60.0,
            cluster_gap_x: 160.0,
            level_gap_x: 70.0,
            row_gap_y: 40.0,
            cluster_padding_x: 32.0,
            cluster_padding_y: 40.0,
            label_height: 24.0,
            min_canvas_width: 900.0,
            min_canvas_height: 600.0,
            root_gap_factor: 2.0,
            cards: CardMetrics::default(),
            default_variant: CardVariant::Small,
            fallback_cluster_label: "General".to_string(),
        }
    }
}

impl LayoutConfig {
    pub fn card(&self, variant: CardVariant) -> CardSize {
        match variant {
            CardVariant::Small => self.cards.small,
            CardVariant::Full => self.cards.full,
        }
    }

    pub fn root_gap(&self) -> f32 {
        self.level_gap_x * self.root_gap_factor
    }

    pub fn validate(&self) -> Result<()> {
        for (field, size) in [("cards.small", self.cards.small), ("cards.full", self.cards.full)] {
            if !(size.width > 0.0 && size.height > 0.0) {
                return Err(Error::InvalidConfig {
                    field,
                    reason: format!("card size must be positive, got {}x{}", size.width, size.height),
                });
            }
        }
        let spacings = [
            ("canvasMargin", self.canvas_margin),
            ("clusterGapX", self.cluster_gap_x),
            ("levelGapX", self.level_gap_x),
            ("rowGapY", self.row_gap_y),
            ("clusterPaddingX", self.cluster_padding_x),
            ("clusterPaddingY", self.cluster_padding_y),
            ("labelHeight", self.label_height),
            ("minCanvasWidth", self.min_canvas_width),
            ("minCanvasHeight", self.min_canvas_height),
            ("rootGapFactor", self.root_gap_factor),
        ];
        for (field, value) in spacings {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidConfig {
                    field,
                    reason: format!("expected a non-negative number, got {value}"),
                });
            }
        }
        if self.fallback_cluster_label.trim().is_empty() {
            return Err(Error::InvalidConfig {
                field: "fallbackClusterLabel",
                reason: "label must not be blank".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct CardSizeFile {
    width: Option<f32>,
    height: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct CardMetricsFile {
    small: Option<CardSizeFile>,
    full: Option<CardSizeFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    canvas_margin: Option<f32>,
    cluster_gap_x: Option<f32>,
    level_gap_x: Option<f32>,
    row_gap_y: Option<f32>,
    cluster_padding_x: Option<f32>,
    cluster_padding_y: Option<f32>,
    label_height: Option<f32>,
    min_canvas_width: Option<f32>,
    min_canvas_height: Option<f32>,
    root_gap_factor: Option<f32>,
    cards: Option<CardMetricsFile>,
    default_variant: Option<CardVariant>,
    fallback_cluster_label: Option<String>,
}

fn merge_card(target: &mut CardSize, file: Option<CardSizeFile>) {
    let Some(file) = file else {
        return;
    };
    if let Some(v) = file.width {
        target.width = v;
    }
    if let Some(v) = file.height {
        target.height = v;
    }
}

pub fn parse_config(contents: &str, json5: bool) -> Result<LayoutConfig> {
    let parsed: ConfigFile = if json5 {
        json5::from_str(contents)?
    } else {
        serde_json::from_str(contents)?
    };

    let mut config = LayoutConfig::default();
    if let Some(v) = parsed.canvas_margin {
        config.canvas_margin = v;
    }
    if let Some(v) = parsed.cluster_gap_x {
        config.cluster_gap_x = v;
    }
    if let Some(v) = parsed.level_gap_x {
        config.level_gap_x = v;
    }
    if let Some(v) = parsed.row_gap_y {
        config.row_gap_y = v;
    }
    if let Some(v) = parsed.cluster_padding_x {
        config.cluster_padding_x = v;
    }
    if let Some(v) = parsed.cluster_padding_y {
        config.cluster_padding_y = v;
    }
    if let Some(v) = parsed.label_height {
        config.label_height = v;
    }
    if let Some(v) = parsed.min_canvas_width {
        config.min_canvas_width = v;
    }
    if let Some(v) = parsed.min_canvas_height {
        config.min_canvas_height = v;
    }
    if let Some(v) = parsed.root_gap_factor {
        config.root_gap_factor = v;
    }
    if let Some(cards) = parsed.cards {
        merge_card(&mut config.cards.small, cards.small);
        merge_card(&mut config.cards.full, cards.full);
    }
    if let Some(v) = parsed.default_variant {
        config.default_variant = v;
    }
    if let Some(v) = parsed.fallback_cluster_label {
        config.fallback_cluster_label = v.trim().to_string();
    }

    config.validate()?;
    Ok(config)
}

pub fn load_config(path: Option<&Path>) -> Result<LayoutConfig> {
    let Some(path) = path else {
        return Ok(LayoutConfig::default());
    };
    let contents = read_to_string(path)?;
    let is_json5 = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json5"))
        .unwrap_or(false);
    let config = parse_config(&contents, is_json5)?;
    tracing::debug!(path = %path.display(), "loaded layout config");
    Ok(config)
}
