//! Parallel compressor using a producer-consumer pipeline.
//!
//! Architecture:
//! - Main thread: split input into blocks, send jobs, drain results
//! - Worker pool: run the match/boost/divide pipeline per block
//! - Main thread: buffer out-of-order results, pack strictly in index order
//!
//! Packing and checksum folding stay on the main thread; they are the only
//! sequential stages, and the checksum is only valid when folded in index
//! order.

use std::collections::BTreeMap;

use crossbeam::channel::{bounded, Receiver, Sender};

use super::run_block;
use crate::error::{Error, Result};
use crate::frame::{max_compressed_size, OutputPacker};
use crate::lz77::MatchFinder;
use crate::stats::BlockResult;
use crate::{CompressConfig, CompressStats, CompressedStream, Compressor};

/// A job for one block: the block's slice of the input.
#[derive(Clone, Copy)]
struct BlockJob {
    index: u32,
    start: usize,
    end: usize,
}

/// Parallel compressor implementation.
pub struct ParallelCompressor {
    config: CompressConfig,
}

impl ParallelCompressor {
    pub fn new(config: CompressConfig) -> Self {
        Self { config }
    }

    fn effective_workers(&self) -> usize {
        match self.config.num_workers {
            0 => num_cpus::get().clamp(1, 32),
            n => n.clamp(1, 32),
        }
    }
}

impl Compressor for ParallelCompressor {
    fn compress(&mut self, input: &[u8]) -> Result<CompressedStream> {
        self.config.validate()?;

        let workers = self.effective_workers();
        if workers == 1 {
            let mut single = super::single::SingleThreadedCompressor::new(self.config.clone());
            return single.compress(input);
        }

        self.compress_parallel(input, workers)
    }
}

impl ParallelCompressor {
    fn compress_parallel(&self, input: &[u8], workers: usize) -> Result<CompressedStream> {
        let channel_capacity = workers * 4;

        let (job_tx, job_rx): (Sender<BlockJob>, Receiver<BlockJob>) = bounded(channel_capacity);
        let (result_tx, result_rx): (Sender<Result<BlockResult>>, Receiver<Result<BlockResult>>) =
            bounded(channel_capacity);

        let result = crossbeam::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();

                scope.spawn(move |_| {
                    worker_thread(input, job_rx, result_tx);
                });
            }

            // Drop our copies of the channel ends the workers use.
            drop(job_rx);
            drop(result_tx);

            self.dispatch_and_pack(input, job_tx, result_rx)
        });

        result.map_err(|_| Error::Internal("Worker thread panicked".to_string()))?
    }

    fn dispatch_and_pack(
        &self,
        input: &[u8],
        job_tx: Sender<BlockJob>,
        result_rx: Receiver<Result<BlockResult>>,
    ) -> Result<CompressedStream> {
        let block_size = self.config.block_size;
        let block_count = if input.is_empty() { 0 } else { (input.len() - 1) / block_size + 1 };

        let mut packer = OutputPacker::new(
            self.config.checksum,
            max_compressed_size(input.len(), block_size),
        );

        // Buffer for completed-but-not-yet-packed blocks.
        let mut pending: BTreeMap<u32, BlockResult> = BTreeMap::new();
        let mut next_pack: u32 = 0;

        for index in 0..block_count as u32 {
            if let Some(cancel) = &self.config.cancel {
                if cancel.is_cancelled() {
                    return Err(Error::Cancelled);
                }
            }

            let start = index as usize * block_size;
            let end = (start + block_size).min(input.len());

            // Small blocks skip the pipeline entirely and go straight to the
            // reorder buffer as stored.
            if end - start < self.config.min_block_size {
                pending.insert(index, BlockResult::stored(index));
                self.drain_ready(input, &mut packer, &mut pending, &mut next_pack)?;
                continue;
            }

            let job = BlockJob { index, start, end };

            // Send the job, draining results as needed to avoid deadlock
            // against the bounded channels.
            loop {
                crossbeam::channel::select! {
                    send(job_tx, job) -> res => {
                        match res {
                            Ok(()) => break,
                            Err(_) => {
                                return Err(Error::Internal("Workers disconnected".to_string()));
                            }
                        }
                    }
                    recv(result_rx) -> res => {
                        match res {
                            Ok(result) => {
                                let block = result?;
                                pending.insert(block.index, block);
                                self.drain_ready(input, &mut packer, &mut pending, &mut next_pack)?;
                            }
                            Err(_) => {
                                return Err(Error::Internal(
                                    "Result channel disconnected".to_string(),
                                ));
                            }
                        }
                    }
                }
            }
        }

        // No more jobs; workers exit when the channel closes.
        drop(job_tx);

        while next_pack < block_count as u32 {
            if self.drain_ready(input, &mut packer, &mut pending, &mut next_pack)? {
                continue;
            }
            match result_rx.recv() {
                Ok(result) => {
                    let result = result?;
                    pending.insert(result.index, result);
                }
                Err(_) => {
                    return Err(Error::Internal("Result channel disconnected".to_string()));
                }
            }
        }

        let packed = packer.finish(input.len() as u64);
        let stats = CompressStats {
            input_bytes: input.len() as u64,
            output_bytes: packed.bytes.len() as u64,
            blocks_written: packed.blocks_written,
            blocks_stored: packed.blocks_stored,
            tokens_packed: packed.tokens_packed,
        };

        Ok(CompressedStream {
            bytes: packed.bytes,
            block_sizes: packed.block_sizes,
            histogram: packed.histogram,
            checksum: packed.checksum,
            stats,
        })
    }

    /// Pack every buffered result that is next in index order. Returns
    /// whether anything was packed.
    fn drain_ready(
        &self,
        input: &[u8],
        packer: &mut OutputPacker,
        pending: &mut BTreeMap<u32, BlockResult>,
        next_pack: &mut u32,
    ) -> Result<bool> {
        let mut packed_any = false;
        while let Some(result) = pending.remove(next_pack) {
            let start = *next_pack as usize * self.config.block_size;
            let end = (start + self.config.block_size).min(input.len());
            packer.pack_block(&result, &input[start..end])?;
            *next_pack += 1;
            packed_any = true;
        }
        Ok(packed_any)
    }
}

/// Worker loop: pull block jobs, run the engine pipeline, push results.
fn worker_thread(input: &[u8], job_rx: Receiver<BlockJob>, result_tx: Sender<Result<BlockResult>>) {
    let mut finder = MatchFinder::new();

    while let Ok(job) = job_rx.recv() {
        let result = run_block(&mut finder, job.index, &input[job.start..job.end]);

        if result_tx.send(result).is_err() {
            // Main thread has stopped, exit.
            break;
        }
    }
}
