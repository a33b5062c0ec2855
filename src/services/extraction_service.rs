use std::sync::Arc;

use log::info;
use serde::Serialize;

use crate::models::travel_plan::{TravelPlan, VideoContext};
use crate::services::{
    ai_client::TextGenerator, itinerary_generator::ItineraryGenerator,
    link_classifier::LinkClassifier,
};

/// Estimated price per token, in yuan.
const COST_PER_TOKEN: f64 = 0.000008;
const FALLBACK_NOTICE: &str = "AI服务暂时不可用，显示预设攻略";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    pub success: bool,
    pub travel_plan: TravelPlan,
    pub video_info: VideoInfo,
    pub usage: UsageSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub title: String,
    pub description: String,
    pub link: String,
    pub analyzed_context: VideoContext,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    pub tokens_used: u64,
    pub cost: String,
}

impl UsageSummary {
    pub fn from_tokens(tokens_used: u64) -> Self {
        Self {
            tokens_used,
            cost: format!("约 {:.4} 元", tokens_used as f64 * COST_PER_TOKEN),
        }
    }
}

/// Share link → destination guess → itinerary, degrading to canned data at
/// every step. The caller always gets a plan.
pub struct ExtractionService {
    classifier: LinkClassifier,
    itinerary_generator: ItineraryGenerator,
}

impl ExtractionService {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            classifier: LinkClassifier::new(generator.clone()),
            itinerary_generator: ItineraryGenerator::new(generator),
        }
    }

    pub async fn extract(&self, link: &str) -> ExtractResponse {
        let classification = self.classifier.classify(link).await;
        let generation = self.itinerary_generator.generate(&classification.context).await;

        let tokens_used =
            classification.usage.total_tokens + generation.usage.total_tokens;
        info!(
            "Token usage: classify={} generate={} total={}",
            classification.usage.total_tokens, generation.usage.total_tokens, tokens_used
        );

        let destination = if classification.context.destination.is_empty() {
            generation.plan.destination.clone()
        } else {
            classification.context.destination.clone()
        };

        let is_fallback = generation.fallback_reason.is_some();
        let description = if is_fallback {
            "AI暂时无法响应，为您提供精选攻略".to_string()
        } else {
            format!("AI为您智能生成的{}深度游攻略", destination)
        };

        ExtractResponse {
            success: true,
            travel_plan: generation.plan,
            video_info: VideoInfo {
                title: format!("{}旅游攻略", destination),
                description,
                link: link.to_string(),
                analyzed_context: classification.context,
            },
            usage: UsageSummary::from_tokens(tokens_used),
            error: is_fallback.then(|| FALLBACK_NOTICE.to_string()),
        }
    }
}
