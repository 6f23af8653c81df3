//! Properties of whole pipeline runs against arbitrary model output

use std::sync::Arc;
use std::time::Duration;

use codeshine_pipeline::{OptimizationRequest, PipelineOrchestrator, PipelineSettings};
use codeshine_providers::ScriptedProvider;
use proptest::prelude::*;

const ORIGINAL: &str = "function pick(items, key) {
  const out = [];
  for (const item of items) {
    if (item.key === key) {
      out.push(item);
    }
  }
  return out;
}
";

fn run_with_output(raw: String) -> codeshine_generation::OptimizationResult {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(async move {
        let provider = Arc::new(ScriptedProvider::new([raw]));
        let settings = PipelineSettings {
            flush_window: Duration::ZERO,
            ..PipelineSettings::default()
        }
        .with_call_timeout(Duration::from_secs(5));
        let orchestrator = Arc::new(PipelineOrchestrator::new(provider, settings));
        let run = orchestrator
            .start(
                OptimizationRequest::new(ORIGINAL)
                    .with_language("javascript")
                    .fast(true),
            )
            .unwrap();
        run.wait().await.unwrap()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_fallback_returns_original(raw in "[a-z{}();=\\n `]{0,120}") {
        let result = run_with_output(raw);
        if !result.parsed {
            prop_assert_eq!(&result.optimized_code, ORIGINAL);
            prop_assert!(result.no_change);
        }
        prop_assert!(result.confidence <= 100);
    }

    #[test]
    fn prop_fenced_original_is_no_change(prefix in "[A-Za-z ]{0,40}") {
        let raw = format!("{}\n```javascript\n{}```\n", prefix, ORIGINAL);
        let result = run_with_output(raw);
        prop_assert!(result.no_change);
        prop_assert_eq!(&result.optimized_code, ORIGINAL);
        prop_assert_eq!(result.similarity, 100);
    }
}
