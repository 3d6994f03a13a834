use crate::{
    context::AppContext, error::AppError, query::Query, query_bus::QueryBus,
    query_handler::QueryHandler,
};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::any::{Any, TypeId, type_name};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

type BoxAnySend = Box<dyn Any + Send>;

type QueryHandlerFuture<'a> =
    Pin<Box<dyn Future<Output = Result<BoxAnySend, AppError>> + Send + 'a>>;

type QueryHandlerFn =
    Arc<dyn for<'a> Fn(BoxAnySend, &'a AppContext) -> QueryHandlerFuture<'a> + Send + Sync>;

/// 基于内存的 QueryBus 实现
/// - 通过 TypeId 注册不同 Query 对应的 Handler
/// - 以类型擦除方式调度，并在调用端进行结果还原
pub struct InMemoryQueryBus {
    handlers: DashMap<TypeId, (&'static str, QueryHandlerFn)>,
}

impl Default for InMemoryQueryBus {
    fn default() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }
}

impl InMemoryQueryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册查询处理器
    pub fn register<Q, H>(&self, handler: Arc<H>) -> Result<(), AppError>
    where
        Q: Query,
        H: QueryHandler<Q> + 'static,
    {
        let Entry::Vacant(slot) = self.handlers.entry(TypeId::of::<Q>()) else {
            return Err(AppError::AlreadyRegisteredQuery { query: Q::NAME });
        };

        let f: QueryHandlerFn = Arc::new(move |boxed_q, ctx| {
            let handler = handler.clone();

            Box::pin(async move {
                match boxed_q.downcast::<Q>() {
                    Ok(q) => {
                        let dto = handler.handle(ctx, *q).await?;
                        Ok(Box::new(dto) as BoxAnySend)
                    }
                    Err(_) => Err(AppError::TypeMismatch {
                        expected: type_name::<Q>(),
                        found: "unknown",
                    }),
                }
            })
        });

        slot.insert((Q::NAME, f));
        Ok(())
    }

    /// 获取已注册的查询名列表（只读视图）
    pub fn registered_queries(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.iter().map(|e| e.value().0).collect();
        names.sort_unstable();
        names
    }
}

#[async_trait]
impl QueryBus for InMemoryQueryBus {
    async fn dispatch<Q: Query>(&self, ctx: &AppContext, q: Q) -> Result<Q::Dto, AppError> {
        let Some(f) = self.handlers.get(&TypeId::of::<Q>()).map(|h| h.1.clone()) else {
            return Err(AppError::HandlerNotFound(Q::NAME));
        };

        debug!(
            query = Q::NAME,
            correlation_id = ctx.biz.correlation_id(),
            "dispatching query"
        );
        let out = (f)(Box::new(q), ctx).await?;

        match out.downcast::<Q::Dto>() {
            Ok(dto) => Ok(*dto),
            Err(_) => Err(AppError::TypeMismatch {
                expected: type_name::<Q::Dto>(),
                found: "unknown",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_bus::CommandBus;
    use crate::config::RegistryConfig;
    use crate::dto::Dto;
    use crate::inmemory_command_bus::InMemoryCommandBus;
    use crate::numbering::{
        GetNumberingRequest, ListNumberingRequests, NumberingService, SubmitNumberingRequest,
        register_numbering_handlers,
    };
    use crate::repository::InMemoryNumberingRepository;
    use registry_domain::numbering::RequestId;
    use serde::Serialize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::task::JoinSet;

    #[derive(Debug)]
    struct Get;

    #[derive(Debug, Serialize)]
    struct NumDto(pub usize);

    impl Dto for NumDto {}

    impl Query for Get {
        const NAME: &'static str = "get";
        type Dto = NumDto;
    }

    struct GetHandler {
        counter: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl QueryHandler<Get> for GetHandler {
        async fn handle(&self, _ctx: &AppContext, _q: Get) -> Result<NumDto, AppError> {
            let v = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(NumDto(v))
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn register_and_dispatch_works() {
        let bus = InMemoryQueryBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        bus.register::<Get, _>(Arc::new(GetHandler {
            counter: counter.clone(),
        }))
        .unwrap();

        let ctx = AppContext::default();
        let NumDto(n) = bus.dispatch(&ctx, Get).await.unwrap();
        assert_eq!(n, 1);
        assert_eq!(bus.registered_queries(), vec!["get"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn not_found_error_when_unregistered() {
        let bus = InMemoryQueryBus::new();
        let ctx = AppContext::default();
        let err = bus.dispatch(&ctx, Get).await.unwrap_err();
        match err {
            AppError::HandlerNotFound(name) => assert_eq!(name, "get"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let bus = InMemoryQueryBus::new();
        let handler = Arc::new(GetHandler {
            counter: Arc::new(AtomicUsize::new(0)),
        });
        bus.register::<Get, _>(handler.clone()).unwrap();
        assert!(matches!(
            bus.register::<Get, _>(handler),
            Err(AppError::AlreadyRegisteredQuery { query: "get" })
        ));
    }

    #[derive(Debug, Serialize)]
    struct WrongDto;

    #[tokio::test]
    async fn type_mismatch_when_handler_returns_foreign_dto() {
        let bus = InMemoryQueryBus::new();
        // 键是 GetNumberingRequest，闭包却返回 WrongDto
        let f: QueryHandlerFn = Arc::new(|_boxed_q, _ctx| {
            Box::pin(async move { Ok(Box::new(WrongDto) as BoxAnySend) })
        });
        bus.handlers.insert(
            TypeId::of::<GetNumberingRequest>(),
            (GetNumberingRequest::NAME, f),
        );

        let ctx = AppContext::default();
        let err = bus
            .dispatch(&ctx, GetNumberingRequest { id: RequestId::new() })
            .await
            .unwrap_err();
        match err {
            AppError::TypeMismatch { expected, .. } => {
                assert!(expected.contains("NumberingRequestDto"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_numbering_queries_see_the_same_request() {
        let service = Arc::new(NumberingService::new(
            InMemoryNumberingRepository::new(),
            RegistryConfig::default(),
        ));
        let commands = InMemoryCommandBus::new();
        let bus = Arc::new(InMemoryQueryBus::new());
        register_numbering_handlers(&commands, &bus, service).unwrap();

        let ctx = AppContext::default();
        let receipt = commands
            .dispatch(
                &ctx,
                SubmitNumberingRequest {
                    requester_name: "Rina".to_string(),
                    supervision_date: "2025-10-20".parse().unwrap(),
                    stage: "Rekapitulasi".to_string(),
                },
            )
            .await
            .unwrap();
        let id: RequestId = receipt.request.id.parse().unwrap();

        let mut set = JoinSet::new();
        for _ in 0..50 {
            let bus = bus.clone();
            let ctx = ctx.clone();
            set.spawn(async move { bus.dispatch(&ctx, GetNumberingRequest { id }).await });
        }
        while let Some(res) = set.join_next().await {
            let dto = res.unwrap().unwrap().expect("request is stored");
            assert_eq!(
                dto.generated_number.as_deref(),
                Some("001/LHP/PM.00.02/JI-24/20/X/2025")
            );
        }

        let list = bus
            .dispatch(&ctx, ListNumberingRequests::default())
            .await
            .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(
            bus.registered_queries(),
            vec![GetNumberingRequest::NAME, ListNumberingRequests::NAME]
        );
    }
}
