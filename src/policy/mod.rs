pub mod lfu;
