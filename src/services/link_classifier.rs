use std::sync::Arc;

use log::{info, warn};
use rand::{seq::SliceRandom, Rng};

use crate::models::travel_plan::VideoContext;
use crate::services::{
    ai_client::{AiError, ChatMessage, GenerationRequest, TextGenerator, TokenUsage},
    json_extract::parse_embedded,
};

const SYSTEM_PROMPT: &str =
    "你是一个旅游内容分析专家，擅长从有限的信息中推断旅游目的地和相关信息。";
const TEMPERATURE: f64 = 0.5;

/// Popular destinations substituted when a link cannot be classified.
pub fn fallback_contexts() -> [VideoContext; 5] {
    [
        VideoContext::new("大理", &["洱海", "古城", "苍山"], "4-5天"),
        VideoContext::new("三亚", &["海滩", "潜水", "海鲜"], "3-4天"),
        VideoContext::new("成都", &["熊猫", "火锅", "宽窄巷子"], "3-4天"),
        VideoContext::new("厦门", &["鼓浪屿", "环岛路", "海鲜"], "3-4天"),
        VideoContext::new("西安", &["兵马俑", "回民街", "古城墙"], "3-4天"),
    ]
}

/// Picks one of [`fallback_contexts`] uniformly at random.
pub fn random_fallback_context<R: Rng + ?Sized>(rng: &mut R) -> VideoContext {
    let contexts = fallback_contexts();
    // The array is non-empty, so `choose` always returns an element.
    contexts
        .choose(rng)
        .cloned()
        .unwrap_or_else(|| contexts[0].clone())
}

#[derive(Debug, Clone)]
pub struct Classification {
    pub context: VideoContext,
    pub usage: TokenUsage,
    /// Set when the context came from the fallback list.
    pub fallback_reason: Option<String>,
}

/// Guesses a destination from an opaque share link with one model call.
pub struct LinkClassifier {
    generator: Arc<dyn TextGenerator>,
}

impl LinkClassifier {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Never fails: any model or parse error yields a random fallback context.
    pub async fn classify(&self, link: &str) -> Classification {
        info!("Analyzing share link: {}", link);

        let (result, usage) = self.try_classify(link).await;
        match result {
            Ok(context) => {
                info!("Link classified as {:?}", context);
                Classification {
                    context,
                    usage,
                    fallback_reason: None,
                }
            }
            Err(err) => {
                let context = random_fallback_context(&mut rand::thread_rng());
                warn!(
                    "Link classification failed ({}), using fallback destination {}",
                    err, context.destination
                );
                Classification {
                    context,
                    usage,
                    fallback_reason: Some(err.to_string()),
                }
            }
        }
    }

    async fn try_classify(&self, link: &str) -> (Result<VideoContext, AiError>, TokenUsage) {
        let request = GenerationRequest {
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(build_prompt(link)),
            ],
            temperature: Some(TEMPERATURE),
            max_tokens: None,
        };

        match self.generator.generate(request).await {
            Ok(completion) => (
                parse_embedded(&completion.content).map_err(AiError::from),
                completion.usage,
            ),
            Err(err) => (Err(err), TokenUsage::default()),
        }
    }
}

pub fn build_prompt(link: &str) -> String {
    format!(
        r#"
分析这个抖音分享链接，猜测可能的旅游目的地。
链接：{link}

如果链接中包含地名线索，请识别出来。如果没有明确信息，请根据常见的旅游热门地推荐一个。

请返回JSON格式：
{{
  "destination": "目的地名称",
  "keywords": ["关键词1", "关键词2"],
  "suggestedDays": "建议天数"
}}
"#
    )
}
