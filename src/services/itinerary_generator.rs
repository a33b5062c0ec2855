use std::sync::Arc;

use log::{info, warn};

use crate::models::travel_plan::{TravelPlan, VideoContext};
use crate::services::{
    ai_client::{AiError, ChatMessage, GenerationRequest, TextGenerator, TokenUsage},
    default_plan::default_plan,
    json_extract::parse_embedded,
};

const SYSTEM_PROMPT: &str = "你是一位经验丰富的旅游规划师，去过中国所有主要旅游城市，了解各地的特色景点、美食、文化。你的攻略实用、详细、贴近当地生活。";
const TEMPERATURE: f64 = 0.8;
const MAX_TOKENS: u32 = 3000;
const PREVIEW_CHARS: usize = 500;

#[derive(Debug, Clone)]
pub struct Generation {
    pub plan: TravelPlan,
    pub usage: TokenUsage,
    /// Set when `plan` is the canned default instead of model output.
    pub fallback_reason: Option<String>,
}

/// Turns a [`VideoContext`] into a full itinerary with one model call.
pub struct ItineraryGenerator {
    generator: Arc<dyn TextGenerator>,
}

impl ItineraryGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Never fails: on any error the default plan for the context's
    /// destination is returned instead. The result is always stamped.
    pub async fn generate(&self, context: &VideoContext) -> Generation {
        info!("Generating itinerary for {}", context.destination);

        let (result, usage) = self.try_generate(context).await;
        let (mut plan, fallback_reason) = match result {
            Ok(plan) => {
                info!(
                    "Itinerary parsed with {} day(s) for {}",
                    plan.daily_plan.len(),
                    plan.destination
                );
                (plan, None)
            }
            Err(err) => {
                warn!(
                    "Itinerary generation failed ({}), using default plan for {:?}",
                    err, context.destination
                );
                (default_plan(&context.destination), Some(err.to_string()))
            }
        };

        plan.stamp(self.generator.model());

        Generation {
            plan,
            usage,
            fallback_reason,
        }
    }

    async fn try_generate(&self, context: &VideoContext) -> (Result<TravelPlan, AiError>, TokenUsage) {
        let request = GenerationRequest {
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(build_prompt(context)),
            ],
            temperature: Some(TEMPERATURE),
            max_tokens: Some(MAX_TOKENS),
        };

        let completion = match self.generator.generate(request).await {
            Ok(completion) => completion,
            Err(err) => return (Err(err), TokenUsage::default()),
        };

        info!("Model returned {} characters", completion.content.chars().count());
        let result = parse_plan(&completion.content);
        if result.is_err() {
            let preview: String = completion.content.chars().take(PREVIEW_CHARS).collect();
            warn!("Unusable itinerary output, first {} chars: {}", PREVIEW_CHARS, preview);
        }

        (result, completion.usage)
    }
}

/// Parses model output into a plan with at least one day.
pub fn parse_plan(content: &str) -> Result<TravelPlan, AiError> {
    let plan: TravelPlan = parse_embedded(content)?;
    if plan.daily_plan.is_empty() {
        return Err(AiError::Validation("dailyPlan is missing or empty".to_string()));
    }
    Ok(plan)
}

pub fn build_prompt(context: &VideoContext) -> String {
    let destination = &context.destination;
    let keywords = if context.keywords.is_empty() {
        "自由行".to_string()
    } else {
        context.keywords.join("、")
    };
    let suggested_days = context
        .suggested_days
        .as_deref()
        .filter(|days| !days.is_empty())
        .unwrap_or("3-5天");

    format!(
        r#"
你是一位资深的旅游规划师，请为【{destination}】制定一份详细实用的旅游攻略。

背景信息：
- 目的地：{destination}
- 相关关键词：{keywords}
- 建议时长：{suggested_days}

要求：
1. 行程安排要合理，不要太赶
2. 包含当地必去景点和特色体验
3. 推荐地道的美食，不要只推荐游客餐厅
4. 住宿建议要包含具体区域
5. 交通方式要详细实用
6. 预算要贴合实际
7. 根据季节给出合适建议（假设是当前季节）

请生成JSON格式的旅游攻略：
{{
  "destination": "{destination}",
  "duration": "X天X晚",
  "budget": "XXXX-XXXX元/人",
  "bestSeason": "最佳旅游季节",
  "summary": "50-100字的行程亮点概述",
  "dailyPlan": [
    {{
      "day": 1,
      "theme": "第一天的主题",
      "activities": [
        {{
          "time": "09:00",
          "place": "具体景点名称",
          "description": "详细的活动安排和游玩建议",
          "duration": "建议游玩时长",
          "cost": "门票价格"
        }}
      ],
      "meals": {{
        "breakfast": "早餐推荐（包含地点和特色）",
        "lunch": "午餐推荐（包含地点和特色）",
        "dinner": "晚餐推荐（包含地点和特色）"
      }},
      "accommodation": "住宿区域建议和理由"
    }}
  ],
  "transportation": {{
    "toDestination": "详细的到达方式（飞机/高铁/自驾）",
    "local": "当地交通攻略（地铁/公交/打车/租车）",
    "tips": "交通小贴士"
  }},
  "packingList": ["物品1", "物品2", "物品3"],
  "foodRecommend": [
    {{
      "name": "美食名称",
      "location": "推荐餐厅或地点",
      "price": "人均价格"
    }}
  ],
  "tips": [
    "实用建议1",
    "实用建议2",
    "实用建议3"
  ],
  "avoidPits": [
    "避坑指南1",
    "避坑指南2"
  ]
}}

注意：请直接返回JSON，不要有其他解释文字。"#
    )
}
