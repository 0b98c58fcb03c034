//! 终端提示音

use std::io::Write;

use super::AudioPlayer;
use crate::error::{NotificationError, Result};

/// 向 stderr 输出 BEL 字符
///
/// stderr 不是终端或已关闭时写入失败，返回的错误由调用方吞掉。
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl AudioPlayer for TerminalBell {
    fn play_cue(&self) -> Result<()> {
        let mut stderr = std::io::stderr().lock();
        stderr
            .write_all(b"\x07")
            .and_then(|_| stderr.flush())
            .map_err(|e| NotificationError::AudioFailed(e.to_string()))
    }
}
