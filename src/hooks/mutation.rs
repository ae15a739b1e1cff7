use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::api::ClassroomApi;
use crate::cache::{QueryCache, QueryKey};
use crate::errors::{ClassroomError, Result};
use crate::runtime::ClientContext;

/// 一个变更操作的定义：调用哪个接口、成功后失效哪些键
#[async_trait]
pub trait MutationDef: Send + Sync + 'static {
    type Args: Send + Sync;
    type Output: Send;

    const NAME: &'static str;

    async fn call(&self, api: &dyn ClassroomApi, args: &Self::Args) -> Result<Self::Output>;

    fn invalidates(&self, args: &Self::Args) -> Vec<QueryKey>;
}

/// 变更生命周期状态
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationState {
    pub is_pending: bool,
    pub is_success: bool,
    pub error: Option<ClassroomError>,
}

/// 变更钩子实例
///
/// 同一实例同时只允许一个进行中的变更，重复调用返回 `Busy` 且不发请求。
pub struct UseMutation<M: MutationDef> {
    def: M,
    api: Arc<dyn ClassroomApi>,
    cache: Arc<QueryCache>,
    state: Mutex<MutationState>,
}

impl<M: MutationDef> UseMutation<M> {
    pub fn new(ctx: &ClientContext, def: M) -> Self {
        Self {
            def,
            api: ctx.api.clone(),
            cache: ctx.cache.clone(),
            state: Mutex::new(MutationState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MutationState> {
        self.state.lock().expect("Mutation state lock poisoned")
    }

    pub fn is_pending(&self) -> bool {
        self.lock().is_pending
    }

    pub fn is_success(&self) -> bool {
        self.lock().is_success
    }

    pub fn error(&self) -> Option<ClassroomError> {
        self.lock().error.clone()
    }

    pub fn state(&self) -> MutationState {
        self.lock().clone()
    }

    pub fn reset(&self) {
        *self.lock() = MutationState::default();
    }

    pub async fn mutate(&self, args: M::Args) -> Result<M::Output> {
        {
            let mut state = self.lock();
            if state.is_pending {
                warn!(mutation = M::NAME, "Mutation refused: another call is in flight");
                return Err(ClassroomError::busy(format!("{} is already in progress", M::NAME)));
            }
            *state = MutationState {
                is_pending: true,
                ..MutationState::default()
            };
        }

        debug!(mutation = M::NAME, "Mutation started");
        let result = self.def.call(self.api.as_ref(), &args).await;

        match &result {
            Ok(_) => {
                for key in self.def.invalidates(&args) {
                    self.cache.invalidate(&key).await;
                }
                info!(mutation = M::NAME, "Mutation succeeded");
            }
            Err(e) => {
                error!(mutation = M::NAME, error = %e, "Mutation failed");
            }
        }

        let mut state = self.lock();
        state.is_pending = false;
        state.is_success = result.is_ok();
        state.error = result.as_ref().err().cloned();
        drop(state);

        result
    }
}
