//! The async interpreter shares the sync resolution algorithm; these tests
//! cover the awaitable dispatch path and a suspending custom block.

use std::sync::Arc;

use async_trait::async_trait;

use blockscript::adapter::IntAdapter;
use blockscript::block::{AllBlock, AnyBlock, AssignmentBlock, IfBlock, VariableGetterBlock};
use blockscript::interface::declaration_in;
use blockscript::{
    AdapterMap, AsyncBlock, AsyncInterpreter, Context, ProcessOptions, Result,
};

fn async_catalog() -> Vec<Box<dyn AsyncBlock>> {
    vec![
        Box::new(IfBlock),
        Box::new(AnyBlock),
        Box::new(AllBlock),
        Box::new(AssignmentBlock),
        Box::new(VariableGetterBlock),
    ]
}

#[tokio::test]
async fn sync_blocks_run_through_the_async_interpreter() {
    let engine = AsyncInterpreter::new(async_catalog());
    let response = engine
        .process(
            "{=(greeting):hi}{greeting} {if(1==1):there|nowhere}",
            AdapterMap::new(),
            ProcessOptions::default(),
        )
        .await
        .expect("pass should succeed");
    assert_eq!(response.body(), "hi there");
}

#[tokio::test]
async fn nested_resolution_is_identical_to_the_sync_variant() {
    let engine = AsyncInterpreter::new(async_catalog());
    let mut variables = AdapterMap::new();
    variables.insert("a".to_string(), Arc::new(IntAdapter::new(1)));
    variables.insert("b".to_string(), Arc::new(IntAdapter::new(3)));
    let response = engine
        .process(
            "{if({a}==1):{if({b}==2):AA|AB}|{if({b}==2):BA|BB}}",
            AdapterMap::new(),
            ProcessOptions::default(),
        )
        .await
        .expect("pass should succeed");
    // Without seed variables the inner {a}/{b} stay unresolved, so the
    // comparisons are string-unequal and both conditionals pick the right half.
    assert_eq!(response.body(), "BB");

    let response = engine
        .process(
            "{if({a}==1):{if({b}==2):AA|AB}|{if({b}==2):BA|BB}}",
            variables,
            ProcessOptions::default(),
        )
        .await
        .expect("pass should succeed");
    assert_eq!(response.body(), "AB");
}

struct LookupBlock;

async fn fetch_display_name(id: &str) -> String {
    // Stands in for a backend call; the await point exercises suspension
    // mid-pass.
    tokio::task::yield_now().await;
    format!("user-{id}")
}

#[async_trait]
impl AsyncBlock for LookupBlock {
    fn will_accept(&self, ctx: &Context<'_>) -> bool {
        declaration_in(&["lookup"], ctx)
    }

    async fn process(&self, ctx: &mut Context<'_>) -> Result<Option<String>> {
        let Some(id) = ctx.verb.parameter.clone() else {
            return Ok(None);
        };
        Ok(Some(fetch_display_name(&id).await))
    }
}

#[tokio::test]
async fn custom_blocks_may_await_mid_pass() {
    let mut blocks = async_catalog();
    blocks.push(Box::new(LookupBlock));
    let engine = AsyncInterpreter::new(blocks);
    let response = engine
        .process(
            "{if(1==1):{lookup(42)}|nobody} says hi",
            AdapterMap::new(),
            ProcessOptions::default(),
        )
        .await
        .expect("pass should succeed");
    assert_eq!(response.body(), "user-42 says hi");
}
