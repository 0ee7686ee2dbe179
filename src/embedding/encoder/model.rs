use candle_core::{DType, Device, Result, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use std::path::Path;

/// BERT encoder followed by attention-masked mean pooling.
///
/// `BertModel::forward` only borrows `&self`, so one instance can serve
/// concurrent callers without a lock.
pub(crate) struct SentenceBert {
    bert: BertModel,
    config: Config,
}

impl SentenceBert {
    pub(crate) fn load(model_dir: &Path, device: &Device) -> Result<Self> {
        let config_content = std::fs::read_to_string(model_dir.join("config.json"))?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| candle_core::Error::Msg(format!("Failed to parse config: {}", e)))?;

        let weights_path = model_dir.join("model.safetensors");
        let vb =
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)? };

        // sentence-transformers exports drop the "bert." prefix; HF checkpoints keep it.
        let bert = if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
            BertModel::load(vb.pp("bert"), &config)?
        } else if vb.contains_tensor("roberta.embeddings.word_embeddings.weight") {
            BertModel::load(vb.pp("roberta"), &config)?
        } else {
            BertModel::load(vb, &config)?
        };

        Ok(Self { bert, config })
    }

    pub(crate) fn hidden_size(&self) -> usize {
        self.config.hidden_size
    }

    pub(crate) fn num_layers(&self) -> usize {
        self.config.num_hidden_layers
    }

    /// Returns one pooled vector per row: `[batch, hidden_size]`.
    pub(crate) fn forward_pooled(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor> {
        let hidden = self
            .bert
            .forward(input_ids, token_type_ids, Some(attention_mask))?;
        mean_pool(&hidden, attention_mask)
    }
}

/// Averages token states over non-padding positions.
///
/// `hidden`: `[batch, seq, hidden]`, `attention_mask`: `[batch, seq]` of 0/1.
pub(crate) fn mean_pool(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let mask = attention_mask.to_dtype(hidden.dtype())?.unsqueeze(2)?;
    let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
    let counts = (mask.sum(1)? + 1e-9)?;
    summed.broadcast_div(&counts)
}
