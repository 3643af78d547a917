//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use super::subscribe::{msubscribevariableheader, MSubscribeHeader};
use super::{MDecodeContext, MDecodePacket};
use crate::errors::{MDecodeErrorKind, MParseError};
use crate::strings::mstring;
use crate::MResult;

/// UNSUBSCRIBE shares its variable header with SUBSCRIBE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MUnsubscribe {
    pub header: MSubscribeHeader,
    pub topic_filters: Vec<String>,
}

fn mtopicfilters(input: &[u8]) -> MResult<'_, Vec<String>> {
    let mut topic_filters = Vec::new();
    let mut input = input;

    while !input.is_empty() {
        let (rest, filter) = mstring(input)?;
        topic_filters.push(filter);
        input = rest;
    }

    Ok((input, topic_filters))
}

impl MDecodePacket for MUnsubscribe {
    fn parse(context: MDecodeContext, input: &[u8]) -> MResult<'_, MUnsubscribe> {
        let (input, header) = msubscribevariableheader(input, context.protocol_level)?;

        // [MQTT-3.10.3-2]
        if input.is_empty() {
            return Err(MParseError::fail(input, MDecodeErrorKind::NoTopicFilters));
        }

        let (input, topic_filters) = mtopicfilters(input)?;

        Ok((
            input,
            MUnsubscribe {
                header,
                topic_filters,
            },
        ))
    }
}
