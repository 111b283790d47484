use std::future::Future;

use futures_util::future::join_all;

/// Run every operation concurrently and wait for all of them to settle.
///
/// Each outcome is returned next to its key, in input order. A failing
/// operation never cancels or hides the others.
pub async fn settle_all<K, F, T, E>(ops: impl IntoIterator<Item = (K, F)>) -> Vec<(K, Result<T, E>)>
where
    F: Future<Output = Result<T, E>>,
{
    let (keys, futs): (Vec<K>, Vec<F>) = ops.into_iter().unzip();
    keys.into_iter().zip(join_all(futs).await).collect()
}

/// Split settled outcomes into successes and failures, keeping relative order.
pub fn partition<K, T, E>(settled: Vec<(K, Result<T, E>)>) -> (Vec<(K, T)>, Vec<(K, E)>) {
    let mut ok = Vec::with_capacity(settled.len());
    let mut failed = Vec::new();
    for (k, r) in settled {
        match r {
            Ok(v) => ok.push((k, v)),
            Err(e) => failed.push((k, e)),
        }
    }
    (ok, failed)
}
