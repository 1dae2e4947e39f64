//! Static registry of user-invokable tools.

use shared::{
    domain::{ToolCategory, ToolId},
    protocol::{SequenceInput, TransformResult},
};

use crate::gateway::{GatewayError, SequenceGateway, TransformOperation};

pub const TOOL_IDS: [ToolId; 7] = [
    ToolId::ReverseComplement,
    ToolId::Transcribe,
    ToolId::ReverseTranscribe,
    ToolId::Translate,
    ToolId::Uppercase,
    ToolId::Lowercase,
    ToolId::Stats,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolAction {
    Transform(TransformOperation),
    Statistics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub id: ToolId,
    pub category: ToolCategory,
    pub name: &'static str,
    pub description: &'static str,
    pub action: ToolAction,
}

impl ToolDescriptor {
    pub const fn for_id(id: ToolId) -> Self {
        use ToolAction::{Statistics, Transform};
        use TransformOperation as Op;

        let (category, name, description, action) = match id {
            ToolId::ReverseComplement => (
                ToolCategory::Conversion,
                "Reverse complement",
                "Reverse complement of a DNA sequence",
                Transform(Op::ReverseComplement),
            ),
            ToolId::Transcribe => (
                ToolCategory::Conversion,
                "Transcribe",
                "Transcribe DNA into RNA (T -> U)",
                Transform(Op::Transcribe),
            ),
            ToolId::ReverseTranscribe => (
                ToolCategory::Conversion,
                "Reverse transcribe",
                "Reverse transcribe RNA into DNA (U -> T)",
                Transform(Op::ReverseTranscribe),
            ),
            ToolId::Translate => (
                ToolCategory::Conversion,
                "Translate",
                "Translate DNA/RNA into a protein sequence",
                Transform(Op::Translate),
            ),
            ToolId::Uppercase => (
                ToolCategory::Basic,
                "Uppercase",
                "Convert the sequence to upper case",
                Transform(Op::Uppercase),
            ),
            ToolId::Lowercase => (
                ToolCategory::Basic,
                "Lowercase",
                "Convert the sequence to lower case",
                Transform(Op::Lowercase),
            ),
            ToolId::Stats => (
                ToolCategory::Analysis,
                "Statistics",
                "Length, composition, GC content and molecular weight",
                Statistics,
            ),
        };

        Self {
            id,
            category,
            name,
            description,
            action,
        }
    }

    pub async fn invoke(
        &self,
        gateway: &dyn SequenceGateway,
        sequence: &str,
    ) -> Result<TransformResult, GatewayError> {
        let input = SequenceInput::new(sequence);
        match self.action {
            ToolAction::Transform(operation) => gateway
                .transform(operation, &input)
                .await
                .map(TransformResult::Sequence),
            ToolAction::Statistics => gateway
                .get_stats(&input)
                .await
                .map(TransformResult::Statistics),
        }
    }
}

pub fn registry() -> Vec<ToolDescriptor> {
    TOOL_IDS.into_iter().map(ToolDescriptor::for_id).collect()
}

pub fn tools_in(category: ToolCategory) -> Vec<ToolDescriptor> {
    registry()
        .into_iter()
        .filter(|tool| tool.category == category)
        .collect()
}
