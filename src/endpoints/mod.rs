// 查询端点定义
// 每个端点只是一份配置：参数名、计数器、上游参数、缓存键规范化与响应整形

use serde_json::{Map, Value};

use crate::cache::Normalizer;
use crate::error::UpstreamError;

/// 参数校验规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    NonEmpty,
    ExactDigits(usize),
}

/// 上游响应整形方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// 原样返回
    Passthrough,
    /// 只取某个必需字段
    Field(&'static str),
    /// 挑选字段，`required` 缺失视为格式错误，其余缺失为 null
    Pick {
        required: &'static str,
        fields: &'static [&'static str],
    },
}

#[derive(Debug)]
pub struct Endpoint {
    pub name: &'static str,
    pub query_param: &'static str,
    pub counter: &'static str,
    pub upstream_pairs: &'static [(&'static str, &'static str)],
    pub normalizer: Normalizer,
    pub validation: Validation,
    pub shape: Shape,
}

pub static NOME: Endpoint = Endpoint {
    name: "nome",
    query_param: "nome",
    counter: "nome",
    upstream_pairs: &[("modulo", "nome")],
    normalizer: Normalizer::Name,
    validation: Validation::NonEmpty,
    shape: Shape::Passthrough,
};

pub static CPF: Endpoint = Endpoint {
    name: "cpf",
    query_param: "cpf",
    counter: "cpf",
    upstream_pairs: &[("modulo", "cpf")],
    normalizer: Normalizer::Digits,
    validation: Validation::ExactDigits(11),
    shape: Shape::Pick {
        required: "cpf",
        fields: &["cpf", "nome", "nascimento", "sexo", "mae"],
    },
};

pub static TELEFONE: Endpoint = Endpoint {
    name: "telefone",
    query_param: "telefone",
    counter: "tel",
    upstream_pairs: &[("modulo", "tel")],
    normalizer: Normalizer::Digits,
    validation: Validation::NonEmpty,
    shape: Shape::Field("resultado"),
};

pub static ALL: [&Endpoint; 3] = [&NOME, &CPF, &TELEFONE];

impl Endpoint {
    /// 规范化查询值，校验失败返回 `None`
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let normalized = self.normalizer.normalize(raw);
        let valid = match self.validation {
            Validation::NonEmpty => !normalized.is_empty(),
            Validation::ExactDigits(n) => {
                normalized.len() == n && normalized.chars().all(|c| c.is_ascii_digit())
            }
        };
        valid.then_some(normalized)
    }

    pub fn shape(&self, payload: Value) -> Result<Value, UpstreamError> {
        if payload.get("erro").is_some_and(|e| !e.is_null()) {
            return Err(UpstreamError::NotFound);
        }

        match self.shape {
            Shape::Passthrough => Ok(payload),
            Shape::Field(field) => match payload {
                Value::Object(mut obj) => obj.remove(field).ok_or(UpstreamError::Malformed),
                _ => Err(UpstreamError::Malformed),
            },
            Shape::Pick { required, fields } => {
                let obj = payload.as_object().ok_or(UpstreamError::Malformed)?;
                if obj.get(required).is_none_or(Value::is_null) {
                    return Err(UpstreamError::Malformed);
                }
                let picked: Map<String, Value> = fields
                    .iter()
                    .map(|f| (f.to_string(), obj.get(*f).cloned().unwrap_or(Value::Null)))
                    .collect();
                Ok(Value::Object(picked))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cpf_requires_eleven_digits() {
        assert_eq!(CPF.normalize("123.456.789-09").as_deref(), Some("12345678909"));
        assert_eq!(CPF.normalize("1234567890"), None);
        assert_eq!(CPF.normalize("abc"), None);
    }

    #[test]
    fn blank_name_is_rejected() {
        assert_eq!(NOME.normalize("   "), None);
        assert_eq!(NOME.normalize(" Joao ").as_deref(), Some("joao"));
    }

    #[test]
    fn telefone_keeps_only_resultado() {
        let shaped = TELEFONE
            .shape(json!({"resultado": [{"nome": "x"}], "owner": "y"}))
            .unwrap();
        assert_eq!(shaped, json!([{"nome": "x"}]));
        assert_eq!(TELEFONE.shape(json!({"owner": "y"})), Err(UpstreamError::Malformed));
    }

    #[test]
    fn cpf_picks_fields_and_fills_nulls() {
        let shaped = CPF
            .shape(json!({"cpf": "12345678909", "nome": "Maria", "pis": "1"}))
            .unwrap();
        assert_eq!(
            shaped,
            json!({"cpf": "12345678909", "nome": "Maria", "nascimento": null, "sexo": null, "mae": null})
        );
        assert_eq!(CPF.shape(json!({"nome": "Maria"})), Err(UpstreamError::Malformed));
    }

    #[test]
    fn erro_field_means_not_found() {
        assert_eq!(
            NOME.shape(json!({"erro": "nada encontrado"})),
            Err(UpstreamError::NotFound)
        );
        assert_eq!(NOME.shape(json!({"erro": null, "a": 1})), Ok(json!({"erro": null, "a": 1})));
    }

    #[test]
    fn endpoint_names_are_unique() {
        let mut names: Vec<_> = ALL.iter().map(|e| e.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ALL.len());
    }
}
