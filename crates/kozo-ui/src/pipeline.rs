//! 命令管道
//!
//! 驱动方（界面或脚本）把拾取到的构件、节点逐个交给正在运行的命令。
//! 两条输入流都是会合点：发送在命令收到之前不会返回。
//! `end_command` 关闭输入流，并且只触发一次结束信号。

use crate::error::{CommandError, Result};
use futures::channel::mpsc;
use futures::{SinkExt, StreamExt};
use kozo_core::element::ElemId;
use kozo_core::frame::Frame;
use kozo_core::node::NodeId;
use std::sync::Arc;
use tokio::sync::{oneshot, RwLock};

/// 命令运行期间独占写入的 Frame
pub type SharedFrame = Arc<RwLock<Frame>>;

/// 一次投递：命令收到后回执
struct Delivery<T> {
    item: T,
    ack: oneshot::Sender<()>,
}

impl<T> Delivery<T> {
    fn accept(self) -> T {
        let _ = self.ack.send(());
        self.item
    }
}

/// 驱动方持有的管道端
#[derive(Default)]
pub struct CommandPipeline {
    elem_tx: Option<mpsc::Sender<Delivery<ElemId>>>,
    node_tx: Option<mpsc::Sender<Delivery<NodeId>>>,
    quit: Option<oneshot::Sender<()>>,
}

/// 命令持有的输入端
pub struct CommandStreams {
    elems: mpsc::Receiver<Delivery<ElemId>>,
    nodes: mpsc::Receiver<Delivery<NodeId>>,
}

impl CommandPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_executing(&self) -> bool {
        self.quit.is_some()
    }

    /// 开始执行命令并装入调用方的结束通道
    pub fn execute(&mut self, quit: oneshot::Sender<()>) -> Result<CommandStreams> {
        if self.is_executing() {
            return Err(CommandError::AlreadyExecuting);
        }
        let (elem_tx, elems) = mpsc::channel(0);
        let (node_tx, nodes) = mpsc::channel(0);
        self.elem_tx = Some(elem_tx);
        self.node_tx = Some(node_tx);
        self.quit = Some(quit);
        tracing::debug!("pipeline executing");
        Ok(CommandStreams { elems, nodes })
    }

    async fn deliver<T>(tx: Option<&mut mpsc::Sender<Delivery<T>>>, item: T) -> Result<()> {
        let tx = tx.ok_or(CommandError::NotExecuting)?;
        let (ack, received) = oneshot::channel();
        tx.send(Delivery { item, ack })
            .await
            .map_err(|_| CommandError::Cancelled)?;
        received.await.map_err(|_| CommandError::Cancelled)
    }

    /// 把构件交给命令，直到命令收到才返回
    pub async fn send_elem(&mut self, elem: ElemId) -> Result<()> {
        Self::deliver(self.elem_tx.as_mut(), elem).await
    }

    /// 把节点交给命令，直到命令收到才返回
    pub async fn send_node(&mut self, node: NodeId) -> Result<()> {
        Self::deliver(self.node_tx.as_mut(), node).await
    }

    /// 关闭输入流并发出结束信号
    pub fn end_command(&mut self) -> Result<()> {
        let quit = self.quit.take().ok_or(CommandError::NotExecuting)?;
        self.elem_tx = None;
        self.node_tx = None;
        // 命令已先行结束时接收端不存在，忽略即可
        let _ = quit.send(());
        tracing::debug!("pipeline ended");
        Ok(())
    }
}

/// 命令一次等待的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Elem(ElemId),
    Node(NodeId),
    Quit,
}

/// 命令侧输入：两条流加结束信号
///
/// 每次等待都与结束信号同时选择，且结束信号优先；
/// 两条流同时就绪时先取构件，再取节点。
pub struct CommandInput {
    streams: CommandStreams,
    quit: oneshot::Receiver<()>,
    finished: bool,
}

impl CommandInput {
    pub fn new(streams: CommandStreams, quit: oneshot::Receiver<()>) -> Self {
        Self {
            streams,
            quit,
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn finish(&mut self) -> Hit {
        self.finished = true;
        Hit::Quit
    }

    /// 等待任一输入
    pub async fn next(&mut self) -> Hit {
        if self.finished {
            return Hit::Quit;
        }
        tokio::select! {
            biased;
            _ = &mut self.quit => self.finish(),
            Some(d) = self.streams.elems.next() => Hit::Elem(d.accept()),
            Some(d) = self.streams.nodes.next() => Hit::Node(d.accept()),
            else => self.finish(),
        }
    }

    /// 只等待构件；节点流保持阻塞
    pub async fn next_elem(&mut self) -> Option<ElemId> {
        if self.finished {
            return None;
        }
        tokio::select! {
            biased;
            _ = &mut self.quit => {
                self.finished = true;
                None
            }
            d = self.streams.elems.next() => match d {
                Some(d) => Some(d.accept()),
                None => {
                    self.finished = true;
                    None
                }
            },
        }
    }

    /// 只等待节点；构件流保持阻塞
    pub async fn next_node(&mut self) -> Option<NodeId> {
        if self.finished {
            return None;
        }
        tokio::select! {
            biased;
            _ = &mut self.quit => {
                self.finished = true;
                None
            }
            d = self.streams.nodes.next() => match d {
                Some(d) => Some(d.accept()),
                None => {
                    self.finished = true;
                    None
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_execute_twice_fails() {
        let mut pipeline = CommandPipeline::new();
        let (q, _rx) = oneshot::channel();
        let _streams = pipeline.execute(q).unwrap();
        let (q2, _rx2) = oneshot::channel();
        assert_eq!(
            pipeline.execute(q2).err(),
            Some(CommandError::AlreadyExecuting)
        );
    }

    #[tokio::test]
    async fn test_end_command_signals_once() {
        let mut pipeline = CommandPipeline::new();
        let (q, rx) = oneshot::channel();
        let _streams = pipeline.execute(q).unwrap();
        pipeline.end_command().unwrap();
        assert!(rx.await.is_ok());
        assert_eq!(pipeline.end_command(), Err(CommandError::NotExecuting));
        assert!(!pipeline.is_executing());
    }

    #[tokio::test]
    async fn test_send_without_command() {
        let mut pipeline = CommandPipeline::new();
        assert_eq!(pipeline.send_elem(1).await, Err(CommandError::NotExecuting));
    }

    #[tokio::test]
    async fn test_rendezvous_order() {
        let mut pipeline = CommandPipeline::new();
        let (q, rx) = oneshot::channel();
        let streams = pipeline.execute(q).unwrap();
        let mut input = CommandInput::new(streams, rx);

        let reader = tokio::spawn(async move {
            let mut hits = Vec::new();
            loop {
                match input.next().await {
                    Hit::Quit => break,
                    hit => hits.push(hit),
                }
            }
            hits
        });

        pipeline.send_elem(5).await.unwrap();
        pipeline.send_node(7).await.unwrap();
        pipeline.send_elem(2).await.unwrap();
        pipeline.end_command().unwrap();

        let hits = reader.await.unwrap();
        assert_eq!(hits, vec![Hit::Elem(5), Hit::Node(7), Hit::Elem(2)]);
    }

    #[tokio::test]
    async fn test_send_after_command_exits() {
        let mut pipeline = CommandPipeline::new();
        let (q, rx) = oneshot::channel();
        let streams = pipeline.execute(q).unwrap();
        drop(CommandInput::new(streams, rx));
        assert_eq!(pipeline.send_elem(1).await, Err(CommandError::Cancelled));
        pipeline.end_command().unwrap();
    }
}
