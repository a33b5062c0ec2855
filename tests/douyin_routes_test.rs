mod common;

use actix_web::test;
use serde_json::{json, Value};

use common::{classifier_reply, plan_reply, ScriptedGenerator, TestApp, TOKENS_PER_CALL};
use travel_planner_api::services::{
    default_plan::default_plan, link_classifier::fallback_contexts,
};

const LINK: &str = "https://v.douyin.com/iRNBho6u/";

async fn extract(test_app: &TestApp, link: &str) -> Value {
    let app = test::init_service(test_app.create_app()).await;
    let req = test::TestRequest::post()
        .uri("/api/douyin/extract")
        .set_json(json!({ "link": link }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    test::read_body_json(resp).await
}

fn without_stamp(mut plan: Value) -> Value {
    let map = plan.as_object_mut().unwrap();
    map.remove("generatedAt");
    map.remove("aiVersion");
    plan
}

#[actix_rt::test]
async fn test_extract_with_model_output() {
    let generator = ScriptedGenerator::new(vec![
        Ok(classifier_reply("丽江").as_str()),
        Ok(format!("这是为您生成的攻略：\n{}\n祝旅途愉快！", plan_reply("丽江")).as_str()),
    ]);
    let test_app = TestApp::with_generator(generator.clone()).await;

    let body = extract(&test_app, LINK).await;

    assert_eq!(generator.calls(), 2);
    assert_eq!(body["success"], true);
    assert!(body.get("error").is_none());
    assert_eq!(body["travelPlan"]["destination"], "丽江");
    assert_eq!(body["travelPlan"]["aiVersion"], "test-model");
    assert!(body["travelPlan"]["generatedAt"].is_string());
    assert_eq!(body["videoInfo"]["title"], "丽江旅游攻略");
    assert_eq!(body["videoInfo"]["description"], "AI为您智能生成的丽江深度游攻略");
    assert_eq!(body["videoInfo"]["link"], LINK);
    assert_eq!(body["videoInfo"]["analyzedContext"]["destination"], "丽江");
    assert_eq!(body["usage"]["tokensUsed"], 2 * TOKENS_PER_CALL);
    assert_eq!(body["usage"]["cost"], "约 0.0016 元");
}

#[actix_rt::test]
async fn test_non_json_plan_falls_back_to_default() {
    let generator = ScriptedGenerator::new(vec![
        Ok(classifier_reply("成都").as_str()),
        Ok("抱歉，我现在无法生成攻略。"),
    ]);
    let test_app = TestApp::with_generator(generator).await;

    let body = extract(&test_app, LINK).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["error"], "AI服务暂时不可用，显示预设攻略");
    assert_eq!(body["videoInfo"]["description"], "AI暂时无法响应，为您提供精选攻略");
    assert_eq!(body["videoInfo"]["title"], "成都旅游攻略");
    assert_eq!(
        without_stamp(body["travelPlan"].clone()),
        serde_json::to_value(default_plan("成都")).unwrap()
    );
    assert_eq!(body["travelPlan"]["aiVersion"], "test-model");
}

#[actix_rt::test]
async fn test_empty_destination_defaults_to_dali() {
    let generator = ScriptedGenerator::new(vec![
        Ok(r#"{"destination": "", "keywords": []}"#),
        Ok("not json at all"),
    ]);
    let test_app = TestApp::with_generator(generator).await;

    let body = extract(&test_app, LINK).await;

    assert_eq!(
        without_stamp(body["travelPlan"].clone()),
        serde_json::to_value(default_plan("大理")).unwrap()
    );
    assert_eq!(body["videoInfo"]["title"], "大理旅游攻略");
}

#[actix_rt::test]
async fn test_classifier_failure_uses_a_preset_context() {
    let fallbacks: Vec<String> = fallback_contexts()
        .iter()
        .map(|c| c.destination.clone())
        .collect();

    // First call fails (classification), second returns a usable plan.
    let generator = ScriptedGenerator::new(vec![Err("connection reset"), Ok(plan_reply("青岛").as_str())]);
    let test_app = TestApp::with_generator(generator).await;

    let body = extract(&test_app, LINK).await;

    let chosen = body["videoInfo"]["analyzedContext"]["destination"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(fallbacks.contains(&chosen), "{} is not a preset", chosen);
    assert!(body.get("error").is_none());
    assert_eq!(body["usage"]["tokensUsed"], TOKENS_PER_CALL);
}

#[actix_rt::test]
async fn test_extract_always_returns_a_plan() {
    for link in ["", "随便一段文字", LINK] {
        let test_app = TestApp::new().await;
        let body = extract(&test_app, link).await;

        assert_eq!(body["success"], true);
        assert!(!body["travelPlan"]["dailyPlan"].as_array().unwrap().is_empty());
        assert_eq!(body["usage"]["tokensUsed"], 0);
        assert_eq!(body["usage"]["cost"], "约 0.0000 元");
        assert!(body["error"].is_string());
    }
}

#[actix_rt::test]
async fn test_extract_without_link_field() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/douyin/extract")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["videoInfo"]["link"], "");
}

#[actix_rt::test]
async fn test_ai_probe() {
    let generator = ScriptedGenerator::new(vec![Ok("大理位于云南省西部。")]);
    let test_app = TestApp::with_generator(generator).await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/ai/test")
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], "大理位于云南省西部。");
    assert_eq!(body["usage"]["total_tokens"], TOKENS_PER_CALL);

    // The script is exhausted, so the next probe fails.
    let req = test::TestRequest::post()
        .uri("/api/ai/test")
        .set_json(json!({ "message": "你好" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}
