use crate::models::travel_plan::{
    DayPlan, FoodRecommendation, Meals, PlannedActivity, TravelPlan, Transportation,
};

/// Destination used when nothing better is known.
pub const DEFAULT_DESTINATION: &str = "大理";

struct DestinationInfo {
    name: &'static str,
    duration: &'static str,
    budget: &'static str,
    best_season: &'static str,
    summary: &'static str,
    highlights: [&'static str; 4],
}

// The first entry doubles as the template for unknown destinations.
static DESTINATIONS: [DestinationInfo; 3] = [
    DestinationInfo {
        name: "大理",
        duration: "4天3晚",
        budget: "2000-3000元/人",
        best_season: "3-5月，9-11月",
        summary: "大理，一个让人放慢脚步的地方。苍山洱海的自然风光，古城的悠闲时光，白族的特色美食，每一处都值得细细品味。",
        highlights: ["洱海骑行", "古城漫步", "苍山索道", "喜洲古镇"],
    },
    DestinationInfo {
        name: "三亚",
        duration: "5天4晚",
        budget: "3000-5000元/人",
        best_season: "10月-次年4月",
        summary: "三亚，中国的热带天堂。细软的沙滩，清澈的海水，丰富的海鲜，奢华的酒店，这里是度假的完美选择。",
        highlights: ["亚龙湾", "蜈支洲岛", "南山寺", "天涯海角"],
    },
    DestinationInfo {
        name: "成都",
        duration: "4天3晚",
        budget: "1500-2500元/人",
        best_season: "3-6月，9-11月",
        summary: "成都，一座来了就不想走的城市。熊猫的萌态，火锅的麻辣，茶馆的悠闲，古街的韵味，让人流连忘返。",
        highlights: ["熊猫基地", "宽窄巷子", "锦里", "都江堰"],
    },
];

fn lookup(destination: &str) -> &'static DestinationInfo {
    DESTINATIONS
        .iter()
        .find(|info| info.name == destination)
        .unwrap_or(&DESTINATIONS[0])
}

fn activity(time: &str, place: String, description: String, duration: &str, cost: &str) -> PlannedActivity {
    PlannedActivity {
        time: time.to_string(),
        place,
        description,
        duration: duration.to_string(),
        cost: cost.to_string(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Builds the canned two-day plan for `destination`.
///
/// Destinations outside the table reuse the first entry's facts, but the
/// requested name still appears in the itinerary text. An empty name means
/// [`DEFAULT_DESTINATION`].
pub fn default_plan(destination: &str) -> TravelPlan {
    let destination = match destination.trim() {
        "" => DEFAULT_DESTINATION,
        name => name,
    };
    let info = lookup(destination);

    let day_one = DayPlan {
        day: 1,
        theme: format!("初识{}", destination),
        activities: vec![
            activity(
                "14:00",
                format!("{}机场/车站", destination),
                format!("抵达{}，前往酒店办理入住", destination),
                "1小时",
                "交通费约50元",
            ),
            activity(
                "16:00",
                format!("{}市区", destination),
                "熟悉周边环境，品尝当地小吃".to_string(),
                "2小时",
                "人均50-100元",
            ),
        ],
        meals: Meals {
            breakfast: "自理".to_string(),
            lunch: "飞机餐/火车餐".to_string(),
            dinner: "当地特色餐厅，人均60-80元".to_string(),
        },
        accommodation: Some("建议住在市中心或景区附近，方便出行".to_string()),
    };

    let day_two = DayPlan {
        day: 2,
        theme: "深度探索".to_string(),
        activities: vec![
            activity(
                "09:00",
                info.highlights[0].to_string(),
                "游览经典景点".to_string(),
                "3小时",
                "门票约100元",
            ),
            activity(
                "14:00",
                info.highlights[1].to_string(),
                "下午继续游览".to_string(),
                "3小时",
                "门票约80元",
            ),
        ],
        meals: Meals {
            breakfast: "酒店早餐".to_string(),
            lunch: "景区附近餐厅".to_string(),
            dinner: "当地美食街".to_string(),
        },
        accommodation: None,
    };

    TravelPlan {
        destination: destination.to_string(),
        duration: info.duration.to_string(),
        budget: info.budget.to_string(),
        best_season: info.best_season.to_string(),
        summary: info.summary.to_string(),
        daily_plan: vec![day_one, day_two],
        transportation: Transportation {
            to_destination: "飞机直达或高铁中转".to_string(),
            local: "地铁、公交、打车都很方便".to_string(),
            tips: "建议下载当地出行App".to_string(),
        },
        packing_list: strings(&["身份证", "充电宝", "防晒用品", "常用药品", "舒适的鞋子"]),
        food_recommend: vec![
            FoodRecommendation {
                name: "特色小吃".to_string(),
                location: "老街/夜市".to_string(),
                price: "20-50元".to_string(),
            },
            FoodRecommendation {
                name: "地方菜".to_string(),
                location: "当地餐厅".to_string(),
                price: "60-100元".to_string(),
            },
        ],
        tips: strings(&[
            "提前预订住宿，避免涨价",
            "下载离线地图，方便导航",
            "准备些现金，部分小店不支持电子支付",
        ]),
        avoid_pits: strings(&["不要在景区购买特产，价格虚高", "打车时要求打表，避免被宰"]),
        ..Default::default()
    }
}
