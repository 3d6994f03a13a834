use anyhow::Result as AnyResult;
use registry_application::command_bus::CommandBus;
use registry_application::config::RegistryConfig;
use registry_application::context::{AppContext, BusinessContext};
use registry_application::numbering::{
    FreezeNumberingRequest, ListNumberingRequests, NumberingService, RecalculateNumbers,
    SubmitNumberingRequest, register_numbering_handlers,
};
use registry_application::query_bus::QueryBus;
use registry_application::repository::InMemoryNumberingRepository;
use registry_application::{InMemoryCommandBus, InMemoryQueryBus};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn request(name: &str, date: &str, stage: &str) -> AnyResult<SubmitNumberingRequest> {
    Ok(SubmitNumberingRequest {
        requester_name: name.to_string(),
        supervision_date: date.parse()?,
        stage: stage.to_string(),
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 配置可来自 JSON 文件，这里直接使用内联字符串
    let config = RegistryConfig::from_json_str(r#"{ "default_page_size": 10 }"#)?;
    let repository = Arc::new(InMemoryNumberingRepository::new());
    let service = Arc::new(NumberingService::new(repository, config));

    let commands = InMemoryCommandBus::new();
    let queries = InMemoryQueryBus::new();
    register_numbering_handlers(&commands, &queries, service)?;

    let ctx = AppContext {
        biz: BusinessContext::builder()
            .maybe_correlation_id(Some("demo".into()))
            .build(),
    };

    // 同日两次取号
    let first = commands
        .dispatch(&ctx, request("Budi", "2025-10-20", "Verifikasi Faktual")?)
        .await?;
    commands
        .dispatch(&ctx, request("Sari", "2025-10-20", "Verifikasi Faktual")?)
        .await?;

    // 冻结首个编号，再补录更早的日期
    commands
        .dispatch(
            &ctx,
            FreezeNumberingRequest {
                id: first.request.id.parse()?,
            },
        )
        .await?;
    let late = commands
        .dispatch(&ctx, request("Rina", "2025-10-15", "Pencocokan Data")?)
        .await?;
    info!(renumbered = late.renumbered, "backdated request submitted");

    let report = commands.dispatch(&ctx, RecalculateNumbers).await?;
    info!(total = report.total, changed = report.changed, "consistency check");

    let history = queries
        .dispatch(&ctx, ListNumberingRequests::default())
        .await?;
    for item in history {
        println!(
            "{:<40} {} {:<6} {:<20} frozen={}",
            item.generated_number.as_deref().unwrap_or("-"),
            item.supervision_date,
            item.requester_name,
            item.stage,
            item.frozen
        );
    }
    Ok(())
}
