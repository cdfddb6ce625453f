use log::Level;

/// 轉換流程的日誌觀察者，由外部注入協調器
pub trait ConversionObserver: Send + Sync {
    fn log(&self, level: Level, message: &str);

    fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }
}

/// 轉發至 `log` 的預設觀察者
pub struct LogObserver;

impl ConversionObserver for LogObserver {
    fn log(&self, level: Level, message: &str) {
        log::log!(target: "png_to_svg", level, "{}", message);
    }
}
