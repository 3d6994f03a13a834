//! 编号服务
//!
//! 引擎本身是纯函数，任一请求的编号依赖整个集合。服务以一把写锁串行化
//! “读取集合 → 追加/修改 → 重算 → 持久化”，保证单写者语义。
//!
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use registry_domain::entity::Entity;
use registry_domain::error::DomainError;
use registry_domain::numbering::{
    NewNumberingRequest, NumberingRequest, RequestId, compute_number_for_new_request,
    recalculate_in_place,
};
use registry_domain::specification::{IsFrozen, Specification};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::command::Command;
use crate::command_handler::CommandHandler;
use crate::config::RegistryConfig;
use crate::context::AppContext;
use crate::error::AppError;
use crate::inmemory_command_bus::InMemoryCommandBus;
use crate::inmemory_query_bus::InMemoryQueryBus;
use crate::numbering::commands::{
    FreezeNumberingRequest, RecalculateNumbers, RescheduleNumberingRequest,
    SubmitNumberingRequest, WithdrawNumberingRequest,
};
use crate::numbering::dto::{NumberingRequestDto, RecalculationReport, SubmissionReceipt};
use crate::numbering::queries::{GetNumberingRequest, ListNumberingRequests};
use crate::query_handler::QueryHandler;
use crate::repository::NumberingRepository;

pub struct NumberingService<R> {
    repository: R,
    config: RegistryConfig,
    write_lock: Mutex<()>,
}

impl<R> NumberingService<R>
where
    R: NumberingRepository,
{
    pub fn new(repository: R, config: RegistryConfig) -> Self {
        Self {
            repository,
            config,
            write_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn position(requests: &[NumberingRequest], id: &RequestId) -> Result<usize, AppError> {
        requests
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| AppError::NotFound(format!("numbering request {id}")))
    }

    fn required(field: &str, value: &str) -> Result<String, AppError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(AppError::Validation(format!("{field} is required")));
        }
        Ok(value.to_string())
    }

    async fn submit(
        &self,
        ctx: &AppContext,
        cmd: SubmitNumberingRequest,
    ) -> Result<SubmissionReceipt, AppError> {
        let new_request = NewNumberingRequest {
            requester_name: Self::required("requester_name", &cmd.requester_name)?,
            supervision_date: cmd.supervision_date,
            stage: Self::required("stage", &cmd.stage)?,
        };

        let _guard = self.write_lock.lock().await;
        let mut requests = self.repository.load_all().await?;

        let request = new_request.into_request(RequestId::new(), Utc::now());
        let number = compute_number_for_new_request(&request, &requests)?;
        let id = *request.id();
        requests.push(request);

        // 补录的日期会推移其后所有日期的编号，因此整体重算
        let changed = recalculate_in_place(&mut requests)?;
        let index = requests.len() - 1;
        if self.config.freeze_on_issue {
            requests[index].freeze()?;
        }
        let receipt = SubmissionReceipt {
            request: NumberingRequestDto::from(&requests[index]),
            renumbered: changed.saturating_sub(1),
        };
        self.repository.replace_all(requests).await?;

        info!(
            request_id = %id,
            number = %number,
            renumbered = receipt.renumbered,
            correlation_id = ctx.biz.correlation_id(),
            "issued supervision number"
        );
        Ok(receipt)
    }

    async fn recalculate(&self, ctx: &AppContext) -> Result<RecalculationReport, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut requests = self.repository.load_all().await?;

        let changed = recalculate_in_place(&mut requests)?;
        let report = RecalculationReport {
            total: requests.len(),
            changed,
        };
        if changed > 0 {
            self.repository.replace_all(requests).await?;
        }

        info!(
            total = report.total,
            changed = report.changed,
            correlation_id = ctx.biz.correlation_id(),
            "recalculated supervision numbers"
        );
        Ok(report)
    }

    async fn reschedule(
        &self,
        ctx: &AppContext,
        cmd: RescheduleNumberingRequest,
    ) -> Result<NumberingRequestDto, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut requests = self.repository.load_all().await?;

        let index = Self::position(&requests, &cmd.id)?;
        requests[index].reschedule(cmd.supervision_date)?;
        recalculate_in_place(&mut requests)?;

        let dto = NumberingRequestDto::from(&requests[index]);
        self.repository.replace_all(requests).await?;

        info!(
            request_id = %cmd.id,
            supervision_date = %cmd.supervision_date,
            number = dto.generated_number.as_deref(),
            correlation_id = ctx.biz.correlation_id(),
            "rescheduled numbering request"
        );
        Ok(dto)
    }

    async fn withdraw(&self, ctx: &AppContext, cmd: WithdrawNumberingRequest) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        let mut requests = self.repository.load_all().await?;

        let index = Self::position(&requests, &cmd.id)?;
        if IsFrozen.is_satisfied_by(&requests[index]) {
            return Err(DomainError::InvalidState {
                reason: format!("request {} is frozen and cannot be withdrawn", cmd.id),
            }
            .into());
        }
        requests.swap_remove(index);
        let changed = recalculate_in_place(&mut requests)?;
        self.repository.replace_all(requests).await?;

        info!(
            request_id = %cmd.id,
            renumbered = changed,
            correlation_id = ctx.biz.correlation_id(),
            "withdrew numbering request"
        );
        Ok(())
    }

    async fn freeze(
        &self,
        ctx: &AppContext,
        cmd: FreezeNumberingRequest,
    ) -> Result<NumberingRequestDto, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut requests = self.repository.load_all().await?;

        let index = Self::position(&requests, &cmd.id)?;
        requests[index].freeze()?;
        let dto = NumberingRequestDto::from(&requests[index]);
        self.repository.replace_all(requests).await?;

        info!(
            request_id = %cmd.id,
            number = dto.generated_number.as_deref(),
            correlation_id = ctx.biz.correlation_id(),
            "froze supervision number"
        );
        Ok(dto)
    }

    async fn list(&self, q: ListNumberingRequests) -> Result<Vec<NumberingRequestDto>, AppError> {
        let page_size = self.config.page_size(q.page_size)?;
        let mut requests = {
            let _guard = self.write_lock.lock().await;
            self.repository.load_all().await?
        };

        // 最新提交的排在最前
        requests.sort_unstable_by(|a, b| b.ordering_key().cmp(&a.ordering_key()));
        Ok(requests
            .iter()
            .take(page_size)
            .map(NumberingRequestDto::from)
            .collect())
    }

    async fn get(&self, q: GetNumberingRequest) -> Result<Option<NumberingRequestDto>, AppError> {
        let requests = {
            let _guard = self.write_lock.lock().await;
            self.repository.load_all().await?
        };
        Ok(requests
            .iter()
            .find(|r| r.id() == &q.id)
            .map(NumberingRequestDto::from))
    }
}

fn rejected<C: Command>(err: &AppError) {
    warn!(command = C::NAME, error = %err, "numbering command rejected");
}

#[async_trait]
impl<R> CommandHandler<SubmitNumberingRequest> for NumberingService<R>
where
    R: NumberingRepository + 'static,
{
    async fn handle(
        &self,
        ctx: &AppContext,
        cmd: SubmitNumberingRequest,
    ) -> Result<SubmissionReceipt, AppError> {
        self.submit(ctx, cmd)
            .await
            .inspect_err(rejected::<SubmitNumberingRequest>)
    }
}

#[async_trait]
impl<R> CommandHandler<RecalculateNumbers> for NumberingService<R>
where
    R: NumberingRepository + 'static,
{
    async fn handle(
        &self,
        ctx: &AppContext,
        _cmd: RecalculateNumbers,
    ) -> Result<RecalculationReport, AppError> {
        self.recalculate(ctx)
            .await
            .inspect_err(rejected::<RecalculateNumbers>)
    }
}

#[async_trait]
impl<R> CommandHandler<RescheduleNumberingRequest> for NumberingService<R>
where
    R: NumberingRepository + 'static,
{
    async fn handle(
        &self,
        ctx: &AppContext,
        cmd: RescheduleNumberingRequest,
    ) -> Result<NumberingRequestDto, AppError> {
        self.reschedule(ctx, cmd)
            .await
            .inspect_err(rejected::<RescheduleNumberingRequest>)
    }
}

#[async_trait]
impl<R> CommandHandler<WithdrawNumberingRequest> for NumberingService<R>
where
    R: NumberingRepository + 'static,
{
    async fn handle(&self, ctx: &AppContext, cmd: WithdrawNumberingRequest) -> Result<(), AppError> {
        self.withdraw(ctx, cmd)
            .await
            .inspect_err(rejected::<WithdrawNumberingRequest>)
    }
}

#[async_trait]
impl<R> CommandHandler<FreezeNumberingRequest> for NumberingService<R>
where
    R: NumberingRepository + 'static,
{
    async fn handle(
        &self,
        ctx: &AppContext,
        cmd: FreezeNumberingRequest,
    ) -> Result<NumberingRequestDto, AppError> {
        self.freeze(ctx, cmd)
            .await
            .inspect_err(rejected::<FreezeNumberingRequest>)
    }
}

#[async_trait]
impl<R> QueryHandler<ListNumberingRequests> for NumberingService<R>
where
    R: NumberingRepository + 'static,
{
    async fn handle(
        &self,
        _ctx: &AppContext,
        q: ListNumberingRequests,
    ) -> Result<Vec<NumberingRequestDto>, AppError> {
        self.list(q).await
    }
}

#[async_trait]
impl<R> QueryHandler<GetNumberingRequest> for NumberingService<R>
where
    R: NumberingRepository + 'static,
{
    async fn handle(
        &self,
        _ctx: &AppContext,
        q: GetNumberingRequest,
    ) -> Result<Option<NumberingRequestDto>, AppError> {
        self.get(q).await
    }
}

/// 将编号服务的全部命令与查询注册到总线
pub fn register_numbering_handlers<R>(
    commands: &InMemoryCommandBus,
    queries: &InMemoryQueryBus,
    service: Arc<NumberingService<R>>,
) -> Result<(), AppError>
where
    R: NumberingRepository + 'static,
{
    commands.register::<SubmitNumberingRequest, _>(service.clone())?;
    commands.register::<RecalculateNumbers, _>(service.clone())?;
    commands.register::<RescheduleNumberingRequest, _>(service.clone())?;
    commands.register::<WithdrawNumberingRequest, _>(service.clone())?;
    commands.register::<FreezeNumberingRequest, _>(service.clone())?;
    queries.register::<ListNumberingRequests, _>(service.clone())?;
    queries.register::<GetNumberingRequest, _>(service)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryNumberingRepository;
    use registry_domain::value_object::SupervisionDate;
    use tracing_test::traced_test;

    fn service() -> NumberingService<InMemoryNumberingRepository> {
        NumberingService::new(InMemoryNumberingRepository::new(), RegistryConfig::default())
    }

    fn submit(date: &str) -> SubmitNumberingRequest {
        SubmitNumberingRequest {
            requester_name: "Andi".to_string(),
            supervision_date: date.parse().unwrap(),
            stage: "Pencocokan dan Penelitian".to_string(),
        }
    }

    #[tokio::test]
    async fn blank_fields_are_rejected_before_touching_storage() {
        let svc = service();
        let ctx = AppContext::default();

        let mut cmd = submit("2025-10-20");
        cmd.requester_name = "   ".to_string();
        let err = svc.submit(&ctx, cmd).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut cmd = submit("2025-10-20");
        cmd.stage.clear();
        assert!(matches!(
            svc.submit(&ctx, cmd).await,
            Err(AppError::Validation(_))
        ));
        assert!(svc.repository.is_empty());
    }

    #[traced_test]
    #[tokio::test]
    async fn submission_logs_issued_number() {
        let svc = service();
        let receipt = svc
            .submit(&AppContext::default(), submit("2025-10-20"))
            .await
            .unwrap();
        assert_eq!(
            receipt.request.generated_number.as_deref(),
            Some("001/LHP/PM.00.02/JI-24/20/X/2025")
        );
        assert_eq!(receipt.renumbered, 0);
        assert!(logs_contain("issued supervision number"));
    }

    #[tokio::test]
    async fn freeze_on_issue_freezes_new_requests() {
        let svc = NumberingService::new(
            InMemoryNumberingRepository::new(),
            RegistryConfig::builder().freeze_on_issue(true).build(),
        );
        let receipt = svc
            .submit(&AppContext::default(), submit("2025-10-20"))
            .await
            .unwrap();
        assert!(receipt.request.frozen);
    }

    #[traced_test]
    #[tokio::test]
    async fn unknown_id_is_not_found_and_logged() {
        let svc = service();
        let err = CommandHandler::handle(
            &svc,
            &AppContext::default(),
            FreezeNumberingRequest {
                id: RequestId::new(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(logs_contain("numbering command rejected"));
    }

    #[tokio::test]
    async fn reschedule_moves_request_between_groups() {
        let svc = service();
        let ctx = AppContext::default();
        let first = svc.submit(&ctx, submit("2025-10-20")).await.unwrap();
        svc.submit(&ctx, submit("2025-10-20")).await.unwrap();

        let id: RequestId = first.request.id.parse().unwrap();
        let dto = svc
            .reschedule(
                &ctx,
                RescheduleNumberingRequest {
                    id,
                    supervision_date: SupervisionDate::from_ymd(2025, 10, 25).unwrap(),
                },
            )
            .await
            .unwrap();
        assert_eq!(
            dto.generated_number.as_deref(),
            Some("002/LHP/PM.00.02/JI-24/25/X/2025")
        );

        let page = svc
            .list(ListNumberingRequests::default())
            .await
            .unwrap();
        let numbers: Vec<_> = page
            .iter()
            .map(|r| r.generated_number.clone().unwrap())
            .collect();
        assert!(numbers.contains(&"001/LHP/PM.00.02/JI-24/20/X/2025".to_string()));
    }
}
