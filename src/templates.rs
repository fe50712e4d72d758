use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use crate::details::DetailField;
use crate::errors::TraceError;

/// Supply-chain stage a trace node belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCategory {
    /// Pond or cage culture.
    Farming,
    /// Cleaning, cooking, freezing, packing.
    Processing,
    /// Laboratory quality checks.
    Inspection,
    /// Cold-chain delivery.
    Transport,
    /// Store shelf.
    Retail,
}

impl NodeCategory {
    /// Generation order; chains are displayed in reverse.
    pub const ALL: [NodeCategory; 5] = [
        NodeCategory::Farming,
        NodeCategory::Processing,
        NodeCategory::Inspection,
        NodeCategory::Transport,
        NodeCategory::Retail,
    ];

    /// Position in the generation order.
    pub const fn ordinal(self) -> usize {
        match self {
            NodeCategory::Farming => 0,
            NodeCategory::Processing => 1,
            NodeCategory::Inspection => 2,
            NodeCategory::Transport => 3,
            NodeCategory::Retail => 4,
        }
    }

    /// Whole days before "now" the stage's timestamp falls on.
    pub const fn days_ago(self) -> i64 {
        match self {
            NodeCategory::Farming => 5,
            NodeCategory::Processing => 4,
            NodeCategory::Inspection => 3,
            NodeCategory::Transport => 2,
            NodeCategory::Retail => 1,
        }
    }

    /// Hours added to the base hour before jitter.
    pub const fn hour_offset(self) -> i64 {
        match self {
            NodeCategory::Farming => 0,
            NodeCategory::Processing => 8,
            NodeCategory::Inspection => 4,
            NodeCategory::Transport => 6,
            NodeCategory::Retail => 2,
        }
    }

    /// Lowercase name, matching the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeCategory::Farming => "farming",
            NodeCategory::Processing => "processing",
            NodeCategory::Inspection => "inspection",
            NodeCategory::Transport => "transport",
            NodeCategory::Retail => "retail",
        }
    }
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a node's status; only `Success` counts as passed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// Stage completed normally.
    Success,
    /// Stage still in progress.
    Pending,
    /// Stage completed with a problem.
    Failed,
}

impl StatusKind {
    /// True only for `Success`.
    pub fn is_success(self) -> bool {
        matches!(self, StatusKind::Success)
    }
}

/// Static description of one candidate site for a stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceNodeTemplate {
    /// Site or carrier display name.
    pub name: Cow<'static, str>,
    /// Address line (or tracking note for carriers).
    pub address: Cow<'static, str>,
    /// Icon token used by renderers.
    pub icon: Cow<'static, str>,
    /// Accent color token used by renderers.
    pub color: Cow<'static, str>,
    /// Detail fields generated for nodes built from this template, in display order.
    pub fields: Vec<DetailField>,
}

impl TraceNodeTemplate {
    /// Template declaring `fields` in display order.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        address: impl Into<Cow<'static, str>>,
        icon: impl Into<Cow<'static, str>>,
        color: impl Into<Cow<'static, str>>,
        fields: impl IntoIterator<Item = DetailField>,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            icon: icon.into(),
            color: color.into(),
            fields: fields.into_iter().collect(),
        }
    }
}

/// Candidate templates for one stage plus the status stamped on its nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StagePoolRecord")]
pub struct StagePool {
    category: NodeCategory,
    status_label: Cow<'static, str>,
    status_kind: StatusKind,
    templates: Vec<TraceNodeTemplate>,
}

impl StagePool {
    /// Build a stage pool; at least one template is required.
    pub fn new(
        category: NodeCategory,
        status_label: impl Into<Cow<'static, str>>,
        status_kind: StatusKind,
        templates: Vec<TraceNodeTemplate>,
    ) -> Result<Self, TraceError> {
        if templates.is_empty() {
            return Err(TraceError::EmptyStage(category));
        }
        Ok(Self {
            category,
            status_label: status_label.into(),
            status_kind,
            templates,
        })
    }

    /// Stage this pool feeds.
    pub fn category(&self) -> NodeCategory {
        self.category
    }

    /// Status text stamped on every node of the stage.
    pub fn status_label(&self) -> &str {
        &self.status_label
    }

    /// Classification behind `status_label`.
    pub fn status_kind(&self) -> StatusKind {
        self.status_kind
    }

    /// Non-empty by construction.
    pub fn templates(&self) -> &[TraceNodeTemplate] {
        &self.templates
    }

    /// Same templates, different status classification.
    pub fn with_status(
        mut self,
        status_label: impl Into<Cow<'static, str>>,
        status_kind: StatusKind,
    ) -> Self {
        self.status_label = status_label.into();
        self.status_kind = status_kind;
        self
    }
}

/// Unvalidated wire form of a `StagePool`.
#[derive(Deserialize)]
struct StagePoolRecord {
    category: NodeCategory,
    status_label: Cow<'static, str>,
    status_kind: StatusKind,
    templates: Vec<TraceNodeTemplate>,
}

impl TryFrom<StagePoolRecord> for StagePool {
    type Error = TraceError;

    fn try_from(record: StagePoolRecord) -> Result<Self, Self::Error> {
        StagePool::new(
            record.category,
            record.status_label,
            record.status_kind,
            record.templates,
        )
    }
}

/// One stage pool per category, indexed by `NodeCategory::ordinal`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TemplatePoolRecord")]
pub struct TemplatePool {
    stages: [StagePool; 5],
}

/// Stages in any order; slotted by category on conversion.
#[derive(Deserialize)]
struct TemplatePoolRecord {
    stages: Vec<StagePool>,
}

impl TryFrom<TemplatePoolRecord> for TemplatePool {
    type Error = TraceError;

    fn try_from(record: TemplatePoolRecord) -> Result<Self, Self::Error> {
        let mut slots: [Option<StagePool>; 5] = Default::default();
        for stage in record.stages {
            let category = stage.category();
            let slot = &mut slots[category.ordinal()];
            if slot.is_some() {
                return Err(TraceError::DuplicateStage(category));
            }
            *slot = Some(stage);
        }
        let [farming, processing, inspection, transport, retail] = slots;
        let take = |slot: Option<StagePool>, category| {
            slot.ok_or(TraceError::MissingStage(category))
        };
        Ok(Self {
            stages: [
                take(farming, NodeCategory::Farming)?,
                take(processing, NodeCategory::Processing)?,
                take(inspection, NodeCategory::Inspection)?,
                take(transport, NodeCategory::Transport)?,
                take(retail, NodeCategory::Retail)?,
            ],
        })
    }
}

impl TemplatePool {
    /// Stage pool for `category`.
    pub fn stage(&self, category: NodeCategory) -> &StagePool {
        &self.stages[category.ordinal()]
    }

    /// Replace the pool of the stage `stage` belongs to.
    pub fn with_stage(mut self, stage: StagePool) -> Self {
        let slot = stage.category().ordinal();
        self.stages[slot] = stage;
        self
    }

    /// Built-in site catalog for eel supply chains.
    pub fn builtin() -> Self {
        use DetailField::*;

        const FARM_FIELDS: [DetailField; 4] = [WaterQuality, FeedType, Density, Inspector];
        const PROCESS_FIELDS: [DetailField; 4] =
            [ProcessType, Temperature, QualityGrade, Inspector];
        const INSPECT_FIELDS: [DetailField; 4] = [TestItems, TestResult, Certificate, Inspector];
        const TRANSPORT_FIELDS: [DetailField; 4] = [VehicleNo, Driver, Temperature, Duration];
        const RETAIL_FIELDS: [DetailField; 4] = [Temperature, Humidity, ShelfDate, Manager];

        let farm = |name: &'static str, address: &'static str| {
            TraceNodeTemplate::new(name, address, "🐟", "#10b981", FARM_FIELDS)
        };
        let plant = |name: &'static str, address: &'static str| {
            TraceNodeTemplate::new(name, address, "🏭", "#6366f1", PROCESS_FIELDS)
        };
        let lab = |name: &'static str, address: &'static str| {
            TraceNodeTemplate::new(name, address, "🔬", "#8b5cf6", INSPECT_FIELDS)
        };
        let carrier = |name: &'static str, address: &'static str| {
            TraceNodeTemplate::new(name, address, "🚚", "#f59e0b", TRANSPORT_FIELDS)
        };
        let store = |name: &'static str, address: &'static str| {
            TraceNodeTemplate::new(name, address, "🏪", "#ec4899", RETAIL_FIELDS)
        };

        Self {
            stages: [
                StagePool {
                    category: NodeCategory::Farming,
                    status_label: "Harvested".into(),
                    status_kind: StatusKind::Success,
                    templates: vec![
                        farm(
                            "Shanghu Aquaculture Base, Yangchun Town",
                            "Yangchun Town, Jiang'an County, Yibin, Sichuan",
                        ),
                        farm(
                            "Poyang Lake Ecological Farm",
                            "Poyang County, Shangrao, Jiangxi",
                        ),
                        farm(
                            "Xiapu Deep-Water Cage Base",
                            "Xiapu County, Ningde, Fujian",
                        ),
                    ],
                },
                StagePool {
                    category: NodeCategory::Processing,
                    status_label: "Processed".into(),
                    status_kind: StatusKind::Success,
                    templates: vec![
                        plant(
                            "Jiang'an Cold-Chain Processing Center",
                            "Industrial Park, Jiang'an County, Yibin, Sichuan",
                        ),
                        plant(
                            "Hangzhou Manxiang Food Processing Plant",
                            "Yuhang District, Hangzhou, Zhejiang",
                        ),
                        plant(
                            "Nantong Haiweifang Processing Center",
                            "Rudong County, Nantong, Jiangsu",
                        ),
                    ],
                },
                StagePool {
                    category: NodeCategory::Inspection,
                    status_label: "Inspection passed".into(),
                    status_kind: StatusKind::Success,
                    templates: vec![
                        lab(
                            "National Aquatic Product Quality Inspection Center",
                            "Haidian District, Beijing",
                        ),
                        lab(
                            "Provincial Agricultural Product Testing Station",
                            "Chengdu, Sichuan",
                        ),
                    ],
                },
                StagePool {
                    category: NodeCategory::Transport,
                    status_label: "Delivered".into(),
                    status_kind: StatusKind::Success,
                    templates: vec![
                        carrier("SF Cold-Chain Logistics", "GPS tracked end to end"),
                        carrier("JD Cold-Chain Delivery", "Temperature controlled end to end"),
                        carrier("ZTO Cold-Chain Express", "Dedicated cold-chain transport"),
                    ],
                },
                StagePool {
                    category: NodeCategory::Retail,
                    status_label: "On shelf".into(),
                    status_kind: StatusKind::Success,
                    templates: vec![
                        store(
                            "Freshippo (MixC)",
                            "B1, MixC, Jinjiang District, Chengdu",
                        ),
                        store(
                            "Yonghui Superstores (Chunxi Road)",
                            "118 Chunxi Road, Jinjiang District, Chengdu",
                        ),
                        store(
                            "Sam's Club (Hi-Tech Zone)",
                            "Tianfu Avenue, Hi-Tech Zone, Chengdu",
                        ),
                    ],
                },
            ],
        }
    }
}

impl Default for TemplatePool {
    fn default() -> Self {
        Self::builtin()
    }
}
