pub(crate) mod candles;
pub(crate) mod flame;
