//! # Claude History Viewer - 可执行入口
//!
//! 核心逻辑位于 `lib.rs`，这里只负责启动并把失败转换为非零退出码。

fn main() {
    if let Err(e) = app_lib::run() {
        eprintln!("claude-history-viewer: {e}");
        std::process::exit(1);
    }
}
