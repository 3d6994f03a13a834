use crate::{
    command::Command, command_bus::CommandBus, command_handler::CommandHandler,
    context::AppContext, error::AppError,
};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::any::{Any, TypeId};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

type BoxAnySend = Box<dyn Any + Send>;

type CmdHandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<BoxAnySend, AppError>> + Send + 'a>>;

type CmdHandlerFn =
    Arc<dyn for<'a> Fn(BoxAnySend, &'a AppContext) -> CmdHandlerFuture<'a> + Send + Sync>;

/// 基于内存的 CommandBus 实现
/// - 通过 TypeId 注册不同 Command 对应的 Handler
/// - 运行时以类型擦除（Any）方式进行调度，并在调用端还原 `C::Output`
pub struct InMemoryCommandBus {
    handlers: DashMap<TypeId, CmdHandlerFn>,
}

impl Default for InMemoryCommandBus {
    fn default() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }
}

impl InMemoryCommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册命令处理器；同一命令重复注册返回错误
    pub fn register<C, H>(&self, handler: Arc<H>) -> Result<(), AppError>
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        let Entry::Vacant(slot) = self.handlers.entry(TypeId::of::<C>()) else {
            return Err(AppError::AlreadyRegisteredCommand { command: C::NAME });
        };

        let f: CmdHandlerFn = Arc::new(move |boxed_cmd, ctx| {
            let handler = handler.clone();

            Box::pin(async move {
                // 正常情况下这里的 downcast 永远不会失败（键与闭包同一泛型 C）
                match boxed_cmd.downcast::<C>() {
                    Ok(cmd) => {
                        let out = handler.handle(ctx, *cmd).await?;
                        Ok(Box::new(out) as BoxAnySend)
                    }
                    Err(_) => Err(AppError::TypeMismatch {
                        expected: C::NAME,
                        found: "unknown",
                    }),
                }
            })
        });

        slot.insert(f);
        Ok(())
    }

    pub fn is_registered<C: Command>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<C>())
    }
}

#[async_trait]
impl CommandBus for InMemoryCommandBus {
    async fn dispatch<C: Command>(&self, ctx: &AppContext, cmd: C) -> Result<C::Output, AppError> {
        let Some(f) = self.handlers.get(&TypeId::of::<C>()).map(|h| h.clone()) else {
            return Err(AppError::HandlerNotFound(C::NAME));
        };

        debug!(
            command = C::NAME,
            correlation_id = ctx.biz.correlation_id(),
            "dispatching command"
        );
        let out = (f)(Box::new(cmd), ctx).await?;

        match out.downcast::<C::Output>() {
            Ok(out) => Ok(*out),
            Err(_) => Err(AppError::TypeMismatch {
                expected: std::any::type_name::<C::Output>(),
                found: "unknown",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Bump {
        by: usize,
    }

    impl Command for Bump {
        const NAME: &'static str = "bump";
        type Output = usize;
    }

    struct BumpHandler {
        counter: AtomicUsize,
    }

    #[async_trait]
    impl CommandHandler<Bump> for BumpHandler {
        async fn handle(&self, _ctx: &AppContext, cmd: Bump) -> Result<usize, AppError> {
            Ok(self.counter.fetch_add(cmd.by, Ordering::SeqCst) + cmd.by)
        }
    }

    #[tokio::test]
    async fn dispatch_returns_typed_output() {
        let bus = InMemoryCommandBus::new();
        bus.register::<Bump, _>(Arc::new(BumpHandler {
            counter: AtomicUsize::new(0),
        }))
        .unwrap();
        assert!(bus.is_registered::<Bump>());

        let ctx = AppContext::default();
        assert_eq!(bus.dispatch(&ctx, Bump { by: 2 }).await.unwrap(), 2);
        assert_eq!(bus.dispatch(&ctx, Bump { by: 3 }).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn unregistered_command_is_reported() {
        let bus = InMemoryCommandBus::new();
        let err = bus
            .dispatch(&AppContext::default(), Bump { by: 1 })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::HandlerNotFound("bump")));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let bus = InMemoryCommandBus::new();
        let handler = Arc::new(BumpHandler {
            counter: AtomicUsize::new(0),
        });
        bus.register::<Bump, _>(handler.clone()).unwrap();
        let err = bus.register::<Bump, _>(handler).unwrap_err();
        assert!(matches!(
            err,
            AppError::AlreadyRegisteredCommand { command: "bump" }
        ));
    }

    #[test]
    fn concurrent_registration_admits_exactly_one_handler() {
        let bus = InMemoryCommandBus::new();
        let handler = Arc::new(BumpHandler {
            counter: AtomicUsize::new(0),
        });

        let accepted = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..16)
                .map(|_| {
                    let handler = handler.clone();
                    let bus = &bus;
                    scope.spawn(move || bus.register::<Bump, _>(handler))
                })
                .collect();
            workers
                .into_iter()
                .map(|w| w.join().unwrap())
                .filter(Result::is_ok)
                .count()
        });
        assert_eq!(accepted, 1);
        assert!(bus.is_registered::<Bump>());
    }
}
